//! Named extension points.
//!
//! Hosts customise a few steps of the built-in commands by registering [`Hook`]s. The set of hook
//! names is closed and each name has a fixed signature, carried by the [`Hook`] variant, so a
//! registration can never mismatch its slot.

use std::fmt;
use std::str::FromStr;

use crate::error::EditorError;
use crate::prompt::PromptReply;

/// Text post-processor (`text -> text`).
pub type TextHook = Box<dyn Fn(&str) -> String + Send>;

/// Custom image dialog. Returns `None` when it does not handle the request.
pub type ImageDialogHook = Box<dyn FnMut() -> Option<PromptReply> + Send>;

/// Names of the available hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    /// Post-processes the selection produced by the blockquote command.
    PostBlockquoteCreation,
    /// Replaces the URL prompt for image commands.
    InsertImageDialog,
}

impl HookName {
    /// External (camelCase) name of the hook.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PostBlockquoteCreation => "postBlockquoteCreation",
            Self::InsertImageDialog => "insertImageDialog",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postBlockquoteCreation" => Ok(Self::PostBlockquoteCreation),
            "insertImageDialog" => Ok(Self::InsertImageDialog),
            other => Err(EditorError::UnknownHook(other.to_string())),
        }
    }
}

/// A hook function tagged with the slot it belongs to.
pub enum Hook {
    /// For [`HookName::PostBlockquoteCreation`].
    PostBlockquoteCreation(TextHook),
    /// For [`HookName::InsertImageDialog`].
    InsertImageDialog(ImageDialogHook),
}

impl Hook {
    /// Wrap a blockquote post-processor.
    pub fn post_blockquote_creation<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        Self::PostBlockquoteCreation(Box::new(f))
    }

    /// Wrap an image dialog.
    pub fn insert_image_dialog<F>(f: F) -> Self
    where
        F: FnMut() -> Option<PromptReply> + Send + 'static,
    {
        Self::InsertImageDialog(Box::new(f))
    }

    /// The slot this hook belongs to.
    pub fn name(&self) -> HookName {
        match self {
            Self::PostBlockquoteCreation(_) => HookName::PostBlockquoteCreation,
            Self::InsertImageDialog(_) => HookName::InsertImageDialog,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.name()).finish()
    }
}

/// The registered hooks. Unset slots behave as their defaults.
#[derive(Default)]
pub struct HookSet {
    post_blockquote_creation: Option<TextHook>,
    insert_image_dialog: Option<ImageDialogHook>,
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field(
                "post_blockquote_creation",
                &self.post_blockquote_creation.is_some(),
            )
            .field("insert_image_dialog", &self.insert_image_dialog.is_some())
            .finish()
    }
}

impl HookSet {
    /// Create a set with every hook at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the hook in `hook`'s slot.
    pub fn set(&mut self, hook: Hook) {
        match hook {
            Hook::PostBlockquoteCreation(f) => self.post_blockquote_creation = Some(f),
            Hook::InsertImageDialog(f) => self.insert_image_dialog = Some(f),
        }
    }

    /// Compose `hook` with the one already registered in its slot.
    ///
    /// Text hooks run in registration order (`new(old(x))`). For dialogs the earlier
    /// registration is asked first and the new one only runs if it declined.
    pub fn chain(&mut self, hook: Hook) {
        match hook {
            Hook::PostBlockquoteCreation(next) => {
                let combined: TextHook = match self.post_blockquote_creation.take() {
                    Some(prev) => Box::new(move |text: &str| next(&prev(text))),
                    None => next,
                };
                self.post_blockquote_creation = Some(combined);
            }
            Hook::InsertImageDialog(mut next) => {
                let combined: ImageDialogHook = match self.insert_image_dialog.take() {
                    Some(mut prev) => Box::new(move || prev().or_else(&mut next)),
                    None => next,
                };
                self.insert_image_dialog = Some(combined);
            }
        }
    }

    /// Restore the default behaviour of `name`.
    pub fn reset(&mut self, name: HookName) {
        match name {
            HookName::PostBlockquoteCreation => self.post_blockquote_creation = None,
            HookName::InsertImageDialog => self.insert_image_dialog = None,
        }
    }

    /// Whether a hook is registered for `name`.
    pub fn is_set(&self, name: HookName) -> bool {
        match name {
            HookName::PostBlockquoteCreation => self.post_blockquote_creation.is_some(),
            HookName::InsertImageDialog => self.insert_image_dialog.is_some(),
        }
    }

    /// Run the blockquote post-processor. Identity by default.
    pub fn post_blockquote_creation(&self, text: &str) -> String {
        match &self.post_blockquote_creation {
            Some(hook) => hook(text),
            None => text.to_string(),
        }
    }

    /// Ask the image dialog for a reply. `None` by default.
    pub fn insert_image_dialog(&mut self) -> Option<PromptReply> {
        self.insert_image_dialog.as_mut().and_then(|hook| hook())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_and_reject_unknown() {
        assert_eq!(
            "postBlockquoteCreation".parse::<HookName>(),
            Ok(HookName::PostBlockquoteCreation)
        );
        assert_eq!(
            "insertImageDialog".parse::<HookName>(),
            Ok(HookName::InsertImageDialog)
        );
        assert_eq!(
            "onPreviewRefresh".parse::<HookName>(),
            Err(EditorError::UnknownHook("onPreviewRefresh".into()))
        );
    }

    #[test]
    fn text_hooks_chain_in_order() {
        let mut hooks = HookSet::new();
        assert_eq!(hooks.post_blockquote_creation("x"), "x");

        hooks.chain(Hook::post_blockquote_creation(|t| format!("{t}1")));
        hooks.chain(Hook::post_blockquote_creation(|t| format!("{t}2")));
        assert_eq!(hooks.post_blockquote_creation("x"), "x12");

        hooks.reset(HookName::PostBlockquoteCreation);
        assert_eq!(hooks.post_blockquote_creation("x"), "x");
    }

    #[test]
    fn first_dialog_that_answers_wins() {
        let mut hooks = HookSet::new();
        assert_eq!(hooks.insert_image_dialog(), None);

        hooks.chain(Hook::insert_image_dialog(|| None));
        hooks.chain(Hook::insert_image_dialog(|| Some(PromptReply::Cancelled)));
        hooks.chain(Hook::insert_image_dialog(|| {
            Some(PromptReply::Submitted("unused".into()))
        }));
        assert_eq!(hooks.insert_image_dialog(), Some(PromptReply::Cancelled));
    }

    #[test]
    fn set_replaces_previous_hook() {
        let mut hooks = HookSet::new();
        hooks.set(Hook::post_blockquote_creation(|t| t.to_uppercase()));
        hooks.set(Hook::post_blockquote_creation(|t| t.to_lowercase()));
        assert_eq!(hooks.post_blockquote_creation("AbC"), "abc");
        assert!(hooks.is_set(HookName::PostBlockquoteCreation));
    }
}
