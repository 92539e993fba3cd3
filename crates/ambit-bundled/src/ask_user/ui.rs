//! Text renderings of the pending ask-user requests.

use std::fmt::Write as _;

use ambit_plugins::TypedUi;

use super::{ChoiceRequest, ConfirmationRequest, ConfirmationVariant, TextRequest};

/// Renders `askForConfirmation` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationDialog;

impl TypedUi for ConfirmationDialog {
    type Props = ConfirmationRequest;

    fn part_type(&self) -> &str {
        "tool-askForConfirmation"
    }

    fn render(&self, props: ConfirmationRequest) -> String {
        let marker = match props.variant {
            ConfirmationVariant::Default => "",
            ConfirmationVariant::Danger => "[!] ",
            ConfirmationVariant::Warning => "[?] ",
        };
        format!(
            "{marker}{}\n{}\n[{}] [{}]",
            props.title, props.message, props.confirm_label, props.cancel_label
        )
    }
}

/// Renders `askForText` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPrompt;

impl TypedUi for TextPrompt {
    type Props = TextRequest;

    fn part_type(&self) -> &str {
        "tool-askForText"
    }

    fn render(&self, props: TextRequest) -> String {
        let mut out = props.question;
        if let Some(placeholder) = props.placeholder {
            let _ = write!(out, "\n({placeholder})");
        }
        if props.multiline {
            out.push_str("\n(multi-line answer)");
        }
        out
    }
}

/// Renders `askForChoice` requests as a numbered list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoicePrompt;

impl TypedUi for ChoicePrompt {
    type Props = ChoiceRequest;

    fn part_type(&self) -> &str {
        "tool-askForChoice"
    }

    fn render(&self, props: ChoiceRequest) -> String {
        let mut out = props.question;
        for (n, option) in (1u32..).zip(&props.options) {
            let _ = write!(out, "\n  {n}. {} ({})", option.label, option.id);
        }
        if props.allow_multiple {
            out.push_str("\n(select one or more)");
        }
        out
    }
}
