//! Rewriting a `<select>`'s children, kept apart from `web_sys` so the order
//! of the DOM steps can be exercised natively.

/// Child-node operations on one `<select>` element.
pub trait SelectNodes {
    type Error;

    /// Removes the first child node of any kind. Returns `false` when there
    /// was nothing left to remove.
    fn remove_first_child(&mut self) -> Result<bool, Self::Error>;

    fn append_option(&mut self, value: &str, label: &str) -> Result<(), Self::Error>;
}

/// Clears every child node, then appends one option per entry in order with
/// value and label both set to the entry. Stops at the first failing step.
pub fn rewrite_options<N: SelectNodes>(nodes: &mut N, options: &[String]) -> Result<(), N::Error> {
    while nodes.remove_first_child()? {}
    for option in options {
        nodes.append_option(option, option)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Step {
        Remove(String),
        Append { value: String, label: String },
    }

    #[derive(Default)]
    struct RecordingSelect {
        children: Vec<String>,
        steps: Vec<Step>,
        fail_append_at: Option<usize>,
    }

    impl SelectNodes for RecordingSelect {
        type Error = String;

        fn remove_first_child(&mut self) -> Result<bool, String> {
            if self.children.is_empty() {
                return Ok(false);
            }
            let removed = self.children.remove(0);
            self.steps.push(Step::Remove(removed));
            Ok(true)
        }

        fn append_option(&mut self, value: &str, label: &str) -> Result<(), String> {
            if self.fail_append_at == Some(self.children.len()) {
                return Err(format!("cannot append {value}"));
            }
            self.children.push(value.to_string());
            self.steps.push(Step::Append {
                value: value.to_string(),
                label: label.to_string(),
            });
            Ok(())
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn every_old_child_is_removed_before_the_first_append() {
        let mut select = RecordingSelect {
            children: strings(&["old-a", "#text", "old-b"]),
            ..RecordingSelect::default()
        };

        rewrite_options(&mut select, &strings(&["alpha", "beta"])).expect("rewrite");

        let first_append = select
            .steps
            .iter()
            .position(|step| matches!(step, Step::Append { .. }))
            .expect("append");
        assert_eq!(first_append, 3);
        assert!(select.steps[..first_append]
            .iter()
            .all(|step| matches!(step, Step::Remove(_))));
        assert_eq!(select.children, strings(&["alpha", "beta"]));
    }

    #[test]
    fn options_use_the_entry_as_value_and_label() {
        let mut select = RecordingSelect::default();

        rewrite_options(&mut select, &strings(&["gamma"])).expect("rewrite");

        assert_eq!(
            select.steps,
            vec![Step::Append {
                value: "gamma".into(),
                label: "gamma".into()
            }]
        );
    }

    #[test]
    fn empty_list_leaves_no_children() {
        let mut select = RecordingSelect {
            children: strings(&["old"]),
            ..RecordingSelect::default()
        };

        rewrite_options(&mut select, &[]).expect("rewrite");

        assert!(select.children.is_empty());
    }

    #[test]
    fn failing_append_stops_the_rewrite() {
        let mut select = RecordingSelect {
            children: strings(&["old"]),
            fail_append_at: Some(1),
            ..RecordingSelect::default()
        };

        let err = rewrite_options(&mut select, &strings(&["a", "b", "c"])).expect_err("fails");

        assert_eq!(err, "cannot append b");
        assert_eq!(select.children, strings(&["a"]));
    }
}
