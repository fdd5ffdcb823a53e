//! Primitive action requests proposed by the planning loop.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ActionId, Capability, TargetDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    TypeText {
        text: String,
        #[serde(default = "default_clear")]
        clear: bool,
    },
    Select {
        option: String,
    },
    Navigate {
        url: String,
    },
    Scroll {
        delta_y: i32,
    },
    Wait {
        millis: u64,
    },
    SendKeys {
        keys: String,
    },
}

fn default_clear() -> bool {
    true
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::TypeText { .. } => "type_text",
            ActionKind::Select { .. } => "select",
            ActionKind::Navigate { .. } => "navigate",
            ActionKind::Scroll { .. } => "scroll",
            ActionKind::Wait { .. } => "wait",
            ActionKind::SendKeys { .. } => "send_keys",
        }
    }

    /// Anything that can alter document structure as a side effect.
    pub fn is_form_mutating(&self) -> bool {
        matches!(
            self,
            ActionKind::Click | ActionKind::TypeText { .. } | ActionKind::Select { .. }
        )
    }

    /// Capability a target must have for this kind, if it takes a target.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            ActionKind::Click => Some(Capability::Clickable),
            ActionKind::TypeText { .. } => Some(Capability::TextInput),
            ActionKind::Select { .. } => Some(Capability::Selectable),
            _ => None,
        }
    }
}

/// One primitive operation plus the planner's stated intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub id: ActionId,
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Observable value the element should show afterwards. Defaults to the
    /// typed text / selected option for those kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

impl ActionRequest {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            id: ActionId::new(),
            kind,
            target: None,
            intent: None,
            expect: None,
        }
    }

    pub fn click(target: TargetDescriptor) -> Self {
        Self::new(ActionKind::Click).with_target(target)
    }

    pub fn type_text(target: TargetDescriptor, text: impl Into<String>) -> Self {
        Self::new(ActionKind::TypeText {
            text: text.into(),
            clear: true,
        })
        .with_target(target)
    }

    pub fn select(target: TargetDescriptor, option: impl Into<String>) -> Self {
        Self::new(ActionKind::Select {
            option: option.into(),
        })
        .with_target(target)
    }

    pub fn with_target(mut self, target: TargetDescriptor) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_expect(mut self, expect: impl Into<String>) -> Self {
        self.expect = Some(expect.into());
        self
    }

    pub fn is_form_mutating(&self) -> bool {
        self.kind.is_form_mutating()
    }

    /// Value verification should look for after this action ran.
    pub fn expected_value(&self) -> Option<&str> {
        if let Some(expect) = self.expect.as_deref() {
            return Some(expect);
        }
        match &self.kind {
            ActionKind::TypeText { text, .. } => Some(text),
            ActionKind::Select { option } => Some(option),
            _ => None,
        }
    }

    /// Expected value given what the field held before the action ran.
    ///
    /// Appending input (`clear: false`) must leave the prior content in
    /// place, so the whole field is expected rather than just the fragment.
    pub fn expected_value_after(&self, prior: Option<&str>) -> Option<String> {
        match (&self.kind, self.expect.as_deref()) {
            (ActionKind::TypeText { text, clear: false }, None) => {
                Some(format!("{}{}", prior.unwrap_or_default(), text))
            }
            _ => self.expected_value().map(str::to_string),
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if let Some(target) = &self.target {
            write!(f, "({target})")?;
        }
        match &self.kind {
            ActionKind::TypeText { text, .. } => write!(f, " {:?}", text),
            ActionKind::Select { option } => write!(f, " {:?}", option),
            ActionKind::Navigate { url } => write!(f, " {url}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_form_mutating_kinds() {
        assert!(ActionKind::Click.is_form_mutating());
        assert!(ActionKind::Select { option: "x".into() }.is_form_mutating());
        assert!(!ActionKind::Scroll { delta_y: 200 }.is_form_mutating());
        assert!(!ActionKind::SendKeys { keys: "Enter".into() }.is_form_mutating());
    }

    #[test]
    fn expected_value_prefers_explicit_expectation() {
        let target = TargetDescriptor::at(1, Capability::TextInput);
        let typed = ActionRequest::type_text(target.clone(), "hello");
        assert_eq!(typed.expected_value(), Some("hello"));
        let typed = typed.with_expect("HELLO world");
        assert_eq!(typed.expected_value(), Some("HELLO world"));
        let click = ActionRequest::click(TargetDescriptor::at(2, Capability::Clickable));
        assert_eq!(click.expected_value(), None);
    }

    #[test]
    fn appended_text_expects_the_whole_field() {
        let target = TargetDescriptor::at(1, Capability::TextInput);
        let append = ActionRequest::new(ActionKind::TypeText {
            text: "thanks".into(),
            clear: false,
        })
        .with_target(target.clone());
        assert_eq!(
            append.expected_value_after(Some("Dear Bob, ")).as_deref(),
            Some("Dear Bob, thanks")
        );
        assert_eq!(append.expected_value_after(None).as_deref(), Some("thanks"));

        let replace = ActionRequest::type_text(target, "thanks");
        assert_eq!(
            replace.expected_value_after(Some("Dear Bob, ")).as_deref(),
            Some("thanks")
        );
    }

    #[test]
    fn deserializes_planner_json() {
        let raw = r#"{"type":"type_text","text":"x","target":{"index":7,"capability":"text-input"}}"#;
        let action: ActionRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(action.kind, ActionKind::TypeText { ref text, clear: true } if text == "x"));
        assert_eq!(action.target.unwrap().index, Some(7));
    }
}
