//! The basic message composer
//!
//! Binds one [`EditorModel`] to an [`EditableSurface`]. Surface events come
//! in as [`ComposerMsg`]s; each one is reconciled into the model, the model is
//! re-rendered onto the surface and the change is offered to the undo
//! history. Effects only the host can perform are returned as [`Cmd`]s.

use crate::commands::Cmd;
use crate::config::{CompositionEndPolicy, ComposerConfig};
use crate::editor::{
    format_range_as_code, format_range_as_quote, parse_plain_text_message, replace_emoticon,
    replace_range_and_move_caret, toggle_inline_format, AutoComplete, DocumentOffset,
    EditorError, EditorModel, HistoryEntry, HistoryManager, ModelUpdate, Part, PartKind,
    Selection, TransformHook,
};
use crate::messages::{ComposerMsg, FormatAction, InputType, Key, KeyEvent};
use crate::slash_commands;
use crate::surface::{
    caret_offset_and_text, range_for_selection, render_model, set_selection, EditableSurface,
};
use crate::util::{byte_offset, char_at, char_len};

/// Called after every model update the composer applies
pub type ChangeListener = Box<dyn FnMut(&EditorModel)>;

pub struct BasicComposer<S> {
    model: EditorModel,
    surface: S,
    history: HistoryManager,
    config: ComposerConfig,
    is_ime_composing: bool,
    /// Composition ended; reconcile on the next tick
    pending_composition_end: bool,
    focused: bool,
    has_text_selected: bool,
    format_bar_visible: bool,
    modified: bool,
    changes: u64,
    change_listener: Option<ChangeListener>,
}

impl<S: EditableSurface> BasicComposer<S> {
    pub fn new(mut model: EditorModel, surface: S, config: ComposerConfig) -> Self {
        if config.auto_replace_emoji {
            model.set_transform_hook(Some(replace_emoticon as TransformHook));
        }
        let mut history =
            HistoryManager::with_limits(config.history.step_length, config.history.max_entries);
        history.clear(model.parts(), Some(model.position_at_end()));

        let mut composer = Self {
            model,
            surface,
            history,
            config,
            is_ime_composing: false,
            pending_composition_end: false,
            focused: false,
            has_text_selected: false,
            format_bar_visible: false,
            modified: false,
            changes: 0,
            change_listener: None,
        };
        render_model(&mut composer.surface, &composer.model);
        composer.refresh_placeholder();
        composer
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, for hosts that edit it directly before sending `Input`
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn set_change_listener(&mut self, listener: Option<ChangeListener>) {
        self.change_listener = listener;
    }

    /// Number of model updates applied so far
    pub fn change_count(&self) -> u64 {
        self.changes
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The caret as the surface currently reports it
    pub fn caret(&self) -> DocumentOffset {
        caret_offset_and_text(&self.surface).0
    }

    pub fn is_caret_at_start(&self) -> bool {
        self.caret().offset == 0
    }

    pub fn is_caret_at_end(&self) -> bool {
        let (caret, text) = caret_offset_and_text(&self.surface);
        caret.offset == char_len(&text)
    }

    pub fn is_selection_collapsed(&self) -> bool {
        self.surface.selection().map_or(true, |s| s.is_collapsed())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether the user changed the content since the composer was created
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_ime_composing(&self) -> bool {
        self.is_ime_composing
    }

    /// Key events are ignored while an input method is composing. The
    /// event's own flag covers events that arrive after composition end.
    pub fn is_composing(&self, event: &KeyEvent) -> bool {
        self.is_ime_composing || event.is_composing
    }

    pub fn has_text_selected(&self) -> bool {
        self.has_text_selected
    }

    pub fn is_format_bar_visible(&self) -> bool {
        self.format_bar_visible
    }

    // ========================================================================
    // Update
    // ========================================================================

    pub fn update(&mut self, msg: ComposerMsg) -> Option<Cmd> {
        match msg {
            ComposerMsg::Input(input_type) => {
                self.on_input(input_type);
                None
            }
            ComposerMsg::CompositionStart => {
                self.is_ime_composing = true;
                self.pending_composition_end = false;
                // composed text must not mix with the placeholder
                self.surface.set_placeholder(None);
                None
            }
            ComposerMsg::CompositionEnd => self.on_composition_end(),
            ComposerMsg::Tick => {
                if std::mem::take(&mut self.pending_composition_end) && !self.is_ime_composing {
                    self.on_input(InputType::InsertCompositionText);
                }
                None
            }
            ComposerMsg::KeyDown(event) => self.handle_key_down(&event),
            ComposerMsg::Paste(text) => self.paste(&text),
            ComposerMsg::SelectionChange => {
                self.on_selection_change();
                None
            }
            ComposerMsg::Focus => {
                self.focus();
                None
            }
            ComposerMsg::Blur => {
                self.focused = false;
                None
            }
            ComposerMsg::Format(action) => {
                self.format(action);
                None
            }
            ComposerMsg::AutoCompleteConfirm(completion) => {
                let update = self.model.auto_complete_confirm(&completion);
                self.apply_optional(update);
                None
            }
            ComposerMsg::AutoCompleteSelectionChange(completion) => {
                let update = self.model.auto_complete_selection_change(completion.as_ref());
                self.apply_optional(update);
                None
            }
            ComposerMsg::InsertMention(user_id) => {
                self.insert_mention(&user_id);
                None
            }
            ComposerMsg::InsertQuote(body) => {
                self.insert_quoted_message(&body);
                None
            }
            ComposerMsg::ReplyTo(_) => {
                tracing::trace!("reply state is kept by the send composer");
                None
            }
        }
    }

    fn on_input(&mut self, input_type: InputType) {
        if self.is_ime_composing {
            tracing::trace!(%input_type, "input ignored while composing");
            return;
        }
        self.pending_composition_end = false;
        self.modified = true;
        let (caret, text) = caret_offset_and_text(&self.surface);
        let result = self.model.update(&text, input_type, caret);
        self.commit(result);
    }

    fn on_composition_end(&mut self) -> Option<Cmd> {
        self.is_ime_composing = false;
        // hosts that emit no input after composition end still need exactly
        // one reconciliation
        match self.config.composition_end {
            CompositionEndPolicy::Immediate => {
                self.on_input(InputType::InsertCompositionText);
                None
            }
            CompositionEndPolicy::Deferred => {
                self.pending_composition_end = true;
                Some(Cmd::ScheduleTick)
            }
        }
    }

    fn on_selection_change(&mut self) {
        let collapsed = self.is_selection_collapsed();
        if collapsed && (self.has_text_selected || self.model.is_empty()) {
            self.model.close_auto_complete();
        }
        if !self.focused {
            return;
        }
        if self.has_text_selected && collapsed {
            self.has_text_selected = false;
            self.format_bar_visible = false;
        } else if !collapsed {
            self.has_text_selected = true;
            self.format_bar_visible = true;
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.surface.focus();
    }

    /// Keys this composer handles. `None` means the event was not handled
    /// and may be interpreted by an outer composer.
    pub fn handle_key_down(&mut self, event: &KeyEvent) -> Option<Cmd> {
        if self.is_composing(event) {
            return None;
        }
        let modifiers = event.modifiers;
        let primary = self.config.primary_modifier;
        let mod_key = primary.is_pressed(&modifiers);

        let mut cmd = Cmd::None;
        match event.key {
            Key::Char('b') if mod_key => self.format(FormatAction::Bold),
            Key::Char('i') if mod_key => self.format(FormatAction::Italics),
            Key::Char('>') if mod_key => self.format(FormatAction::Quote),
            Key::Char('z') if mod_key => self.undo(),
            Key::Char('y') if mod_key => self.redo(),
            Key::Enter
                if modifiers.shift || (primary.alt_enter_inserts_newline() && modifiers.alt) =>
            {
                self.insert_text("\n", InputType::InsertText)
            }
            ref key => {
                // autocomplete keys and sending take no modifiers
                let meta_or_alt = modifiers.meta_or_alt();
                let modifier_pressed = meta_or_alt || modifiers.shift;
                if self.model.auto_complete().is_some_and(AutoComplete::has_completions) {
                    let has_selection =
                        self.model.auto_complete().is_some_and(AutoComplete::has_selection);
                    let update = match key {
                        Key::ArrowUp if !modifier_pressed => self.model.auto_complete_up(),
                        Key::ArrowDown if !modifier_pressed => self.model.auto_complete_down(),
                        Key::Tab if !meta_or_alt => self.model.auto_complete_tab(modifiers.shift),
                        Key::Escape if !modifier_pressed => self.model.auto_complete_escape(),
                        Key::Enter if !modifiers.any() && has_selection => {
                            self.model.auto_complete_enter()
                        }
                        _ => return None,
                    };
                    self.apply_optional(update);
                } else if *key == Key::Tab {
                    cmd = self.tab_complete_name();
                } else {
                    if matches!(key, Key::Backspace | Key::Delete) {
                        self.format_bar_visible = false;
                    }
                    return None;
                }
            }
        }
        tracing::trace!(key = ?event.key, "key handled");
        Some(Cmd::batch(vec![cmd, Cmd::PreventDefault]))
    }

    /// Complete the word before the caret as a name. Flashes the composer
    /// when nothing matches.
    fn tab_complete_name(&mut self) -> Cmd {
        match self.try_tab_complete_name() {
            Ok(true) => Cmd::None,
            Ok(false) => {
                self.model.close_auto_complete();
                Cmd::VisualBell
            }
            Err(err) => {
                tracing::error!(error = %err, "tab completion failed");
                Cmd::None
            }
        }
    }

    fn try_tab_complete_name(&mut self) -> Result<bool, EditorError> {
        let caret = self.caret();
        let position = self.model.position_for_offset(caret.offset, caret.at_node_end);
        let mut range = self.model.start_range(position, None);
        range.expand_backwards_while(&self.model, |_, offset, part| {
            char_at(&part.text, offset) != Some(' ')
                && matches!(
                    part.kind,
                    PartKind::Plain | PartKind::PillCandidate | PartKind::Command
                )
        })?;
        let text = range.text(&self.model)?;
        let update = self.model.transform(|model| {
            let candidate = model.part_creator().pill_candidate(text);
            let added = range.replace(model, vec![candidate])?;
            Ok(Selection::Collapsed(model.position_for_offset(
                caret.offset.saturating_add_signed(added),
                true,
            )))
        })?;
        self.apply_update(update);
        let update = self.model.auto_complete_tab(false);
        self.apply_optional(update);
        Ok(self.model.auto_complete().is_some_and(AutoComplete::has_selection))
    }

    /// Splice `text` in at the caret, as if typed
    fn insert_text(&mut self, text_to_insert: &str, input_type: InputType) {
        let (caret, text) = caret_offset_and_text(&self.surface);
        let at = byte_offset(&text, caret.offset);
        let mut new_text = String::with_capacity(text.len() + text_to_insert.len());
        new_text.push_str(&text[..at]);
        new_text.push_str(text_to_insert);
        new_text.push_str(&text[at..]);
        let caret = DocumentOffset::new(caret.offset + char_len(text_to_insert), true);
        self.modified = true;
        let result = self.model.update(&new_text, input_type, caret);
        self.commit(result);
    }

    fn undo(&mut self) {
        if let Some(HistoryEntry { parts, caret, .. }) = self.history.undo() {
            // tagged so the history does not record its own replay
            let result = self.model.reset(parts, caret, Some(InputType::HistoryUndo));
            self.commit(result);
        }
    }

    fn redo(&mut self) {
        if let Some(HistoryEntry { parts, caret, .. }) = self.history.redo() {
            let result = self.model.reset(parts, caret, Some(InputType::HistoryRedo));
            self.commit(result);
        }
    }

    /// Replace the selection with pasted plain text
    pub fn paste(&mut self, text: &str) -> Option<Cmd> {
        if text.is_empty() {
            return None;
        }
        self.modified = true;
        let range = range_for_selection(&self.surface, &self.model).unwrap_or_else(|| {
            let end = self.model.position_at_end();
            self.model.start_range(end, None)
        });
        let parts = parse_plain_text_message(text, self.model.part_creator(), false);
        let result = replace_range_and_move_caret(&mut self.model, range, parts);
        self.commit(result);
        Some(Cmd::PreventDefault)
    }

    /// Apply a format action to the selection. Does nothing without one.
    pub fn format(&mut self, action: FormatAction) {
        let Some(range) = range_for_selection(&self.surface, &self.model) else {
            return;
        };
        if range.length(&self.model).unwrap_or(0) == 0 {
            return;
        }
        self.history.ensure_last_changes_pushed();
        self.modified = true;
        tracing::debug!(?action, "format selection");
        let model = &mut self.model;
        let result = match action {
            FormatAction::Bold => toggle_inline_format(model, range, "**", "**"),
            FormatAction::Italics => toggle_inline_format(model, range, "_", "_"),
            FormatAction::Strikethrough => toggle_inline_format(model, range, "<del>", "</del>"),
            FormatAction::Code => format_range_as_code(model, range),
            FormatAction::Quote => format_range_as_quote(model, range),
        };
        self.commit(result);
    }

    /// Insert a mention pill for `user_id` at the caret
    pub fn insert_mention(&mut self, user_id: &str) {
        let caret = self.caret();
        let position = self.model.position_for_offset(caret.offset, caret.at_node_end);
        let pc = self.model.part_creator();
        let display_name = pc.display_name_for(user_id);
        let parts = pc.create_mention_parts(position.index + 1, display_name, user_id);
        let result = self.model.transform(|model| {
            let added = model.insert(parts, position)?;
            Ok(Selection::Collapsed(
                model.position_for_offset(caret.offset + added, true),
            ))
        });
        self.commit(result);
        self.focus();
    }

    /// Insert `body` as a quote at the start of the message
    pub fn insert_quoted_message(&mut self, body: &str) {
        let pc = self.model.part_creator();
        let mut parts = parse_plain_text_message(body, pc, true);
        parts.push(pc.newline());
        parts.push(pc.newline());
        let result = self.model.transform(|model| {
            let start = model.position_for_offset(0, false);
            let added = model.insert(parts, start)?;
            Ok(Selection::Collapsed(model.position_for_offset(added, true)))
        });
        self.commit(result);
        self.focus();
    }

    /// Replace the whole message, caret at the end
    pub fn reset(&mut self, parts: Vec<Part>) {
        let result = self.model.reset(parts, None, None);
        self.commit(result);
    }

    /// Forget the undo history; the current content becomes the baseline
    pub fn clear_undo_history(&mut self) {
        self.history
            .clear(self.model.parts(), Some(self.model.position_at_end()));
    }

    // ========================================================================
    // Applying updates
    // ========================================================================

    fn commit(&mut self, result: Result<ModelUpdate, EditorError>) {
        match result {
            Ok(update) => self.apply_update(update),
            Err(err) => {
                // the model is untouched; bring the surface back in line
                tracing::error!(error = %err, "model update rejected");
                render_model(&mut self.surface, &self.model);
            }
        }
    }

    fn apply_optional(&mut self, update: Option<ModelUpdate>) {
        if let Some(update) = update {
            self.apply_update(update);
        }
    }

    fn apply_update(&mut self, update: ModelUpdate) {
        render_model(&mut self.surface, &self.model);
        if let Some(selection) = &update.selection {
            set_selection(&mut self.surface, &self.model, selection);
        }
        self.refresh_placeholder();
        let caret = update.selection.as_ref().map(Selection::end);
        self.history.try_push(
            self.model.parts(),
            caret,
            update.input_type.as_ref(),
            update.diff.as_ref(),
        );
        if let Some(client) = self.model.part_creator().client() {
            client.set_typing(self.is_typing());
        }
        self.changes += 1;
        if let Some(listener) = self.change_listener.as_mut() {
            listener(&self.model);
        }
    }

    fn refresh_placeholder(&mut self) {
        let Some(placeholder) = self.config.placeholder.as_deref() else {
            return;
        };
        if self.model.is_empty() {
            self.surface.set_placeholder(Some(placeholder));
        } else {
            self.surface.set_placeholder(None);
        }
    }

    /// Typing only counts for commands that post into the room
    fn is_typing(&self) -> bool {
        match self.model.parts().first() {
            None => false,
            Some(first) if first.kind == PartKind::Command => {
                slash_commands::sends_message(&first.text)
            }
            Some(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::client::LocalRoom;
    use crate::completer::RoomCompleter;
    use crate::config::PrimaryModifier;
    use crate::editor::PartCreator;
    use crate::messages::Modifiers;
    use crate::surface::{MemorySurface, SurfaceSelection};

    fn config() -> ComposerConfig {
        ComposerConfig {
            primary_modifier: PrimaryModifier::Ctrl,
            placeholder: Some("Send a message…".to_string()),
            ..ComposerConfig::default()
        }
    }

    fn composer_with(config: ComposerConfig) -> (BasicComposer<MemorySurface>, Rc<LocalRoom>) {
        let room = Rc::new(
            LocalRoom::new("!room:example.org", "@me:example.org")
                .with_member("@alice:example.org", "Alice")
                .with_member("@bob:example.org", "Bob"),
        );
        let pc = PartCreator::new()
            .with_client(room.clone())
            .with_auto_complete(Rc::new(RoomCompleter::new(room.clone())));
        let composer = BasicComposer::new(EditorModel::new(Vec::new(), pc), MemorySurface::new(), config);
        (composer, room)
    }

    fn composer() -> BasicComposer<MemorySurface> {
        composer_with(config()).0
    }

    fn type_text(composer: &mut BasicComposer<MemorySurface>, text: &str) {
        composer.surface_mut().type_text(text);
        composer.update(ComposerMsg::Input(InputType::InsertText));
    }

    fn ctrl(ch: char) -> ComposerMsg {
        ComposerMsg::KeyDown(KeyEvent::new(
            Key::Char(ch),
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        ))
    }

    #[test]
    fn test_typing_updates_model_and_placeholder() {
        let mut c = composer();
        assert_eq!(c.surface().placeholder(), Some("Send a message…"));
        type_text(&mut c, "hello");
        assert_eq!(c.model().text(), "hello");
        assert_eq!(c.surface().placeholder(), None);
        assert!(c.is_modified());
        assert!(c.is_caret_at_end());
        assert!(!c.is_caret_at_start());
    }

    #[test]
    fn test_typing_notifications() {
        let (mut c, room) = composer_with(config());
        type_text(&mut c, "hi");
        c.surface_mut().select_all();
        c.surface_mut().delete_backward();
        c.update(ComposerMsg::Input(InputType::DeleteContentBackward));
        assert_eq!(room.typing_notifications(), vec![true, false]);
    }

    #[test]
    fn test_deferred_composition_end() {
        let mut c = composer();
        c.update(ComposerMsg::CompositionStart);
        assert_eq!(c.surface().placeholder(), None);
        c.surface_mut().type_text("にほ");
        c.update(ComposerMsg::Input(InputType::InsertCompositionText));
        assert_eq!(c.model().text(), "");

        let cmd = c.update(ComposerMsg::CompositionEnd);
        assert_eq!(cmd, Some(Cmd::ScheduleTick));
        assert_eq!(c.model().text(), "");
        c.update(ComposerMsg::Tick);
        assert_eq!(c.model().text(), "にほ");
        // a second tick does not reconcile again
        let changes = c.change_count();
        c.update(ComposerMsg::Tick);
        assert_eq!(c.change_count(), changes);
    }

    #[test]
    fn test_immediate_composition_end() {
        let (mut c, _) = composer_with(ComposerConfig {
            composition_end: CompositionEndPolicy::Immediate,
            ..config()
        });
        c.update(ComposerMsg::CompositionStart);
        c.surface_mut().type_text("é");
        assert_eq!(c.update(ComposerMsg::CompositionEnd), None);
        assert_eq!(c.model().text(), "é");
    }

    #[test]
    fn test_keys_ignored_while_composing() {
        let mut c = composer();
        type_text(&mut c, "a");
        c.update(ComposerMsg::CompositionStart);
        let shift_enter = KeyEvent::new(
            Key::Enter,
            Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        );
        assert_eq!(c.handle_key_down(&shift_enter), None);
        assert_eq!(c.model().text(), "a");
    }

    #[test]
    fn test_undo_redo_shortcuts() {
        let mut c = composer();
        type_text(&mut c, "hello");
        assert!(c.can_undo());
        assert_eq!(c.update(ctrl('z')), Some(Cmd::PreventDefault));
        assert_eq!(c.model().text(), "");
        assert_eq!(c.surface().text(), "");
        assert!(c.can_redo());
        c.update(ctrl('y'));
        assert_eq!(c.model().text(), "hello");
        assert!(!c.can_redo());
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut c = composer();
        type_text(&mut c, "ab");
        c.surface_mut().set_caret(1);
        let cmd = c.update(ComposerMsg::KeyDown(KeyEvent::new(
            Key::Enter,
            Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        )));
        assert_eq!(cmd, Some(Cmd::PreventDefault));
        assert_eq!(c.model().text(), "a\nb");
        assert_eq!(c.model().parts()[1].kind, PartKind::Newline);
        assert_eq!(c.surface().caret(), 2);
    }

    #[test]
    fn test_plain_enter_is_not_handled() {
        let mut c = composer();
        type_text(&mut c, "ab");
        assert_eq!(c.update(ComposerMsg::KeyDown(KeyEvent::plain(Key::Enter))), None);
    }

    #[test]
    fn test_bold_shortcut_and_format_bar() {
        let mut c = composer();
        type_text(&mut c, "hello world");
        c.update(ComposerMsg::Focus);
        c.surface_mut().select(6, 11);
        c.update(ComposerMsg::SelectionChange);
        assert!(c.has_text_selected());
        assert!(c.is_format_bar_visible());

        c.update(ctrl('b'));
        assert_eq!(c.model().text(), "hello **world**");

        c.surface_mut().set_caret(0);
        c.update(ComposerMsg::SelectionChange);
        assert!(!c.has_text_selected());
    }

    #[test]
    fn test_collapsing_selection_closes_auto_complete() {
        let mut c = composer();
        c.update(ComposerMsg::Focus);
        type_text(&mut c, "@bo");
        assert!(c.model().auto_complete().is_some());

        c.surface_mut().select(0, 3);
        c.update(ComposerMsg::SelectionChange);
        assert!(c.model().auto_complete().is_some());

        c.surface_mut().set_caret(3);
        c.update(ComposerMsg::SelectionChange);
        assert!(c.model().auto_complete().is_none());
        assert!(!c.has_text_selected());

        // closing is idempotent
        c.update(ComposerMsg::SelectionChange);
        assert!(c.model().auto_complete().is_none());
        assert_eq!(c.model().text(), "@bo");
    }

    #[test]
    fn test_caret_move_keeps_auto_complete_open() {
        let mut c = composer();
        c.update(ComposerMsg::Focus);
        type_text(&mut c, "@bo");
        c.surface_mut().set_caret(2);
        c.update(ComposerMsg::SelectionChange);
        assert!(c.model().auto_complete().is_some());
    }

    #[test]
    fn test_format_needs_selection() {
        let mut c = composer();
        type_text(&mut c, "hello");
        let changes = c.change_count();
        c.update(ComposerMsg::Format(FormatAction::Strikethrough));
        assert_eq!(c.change_count(), changes);
        assert_eq!(c.model().text(), "hello");
    }

    #[test]
    fn test_paste_replaces_selection() {
        let mut c = composer();
        type_text(&mut c, "hello world");
        c.surface_mut().select(0, 5);
        let cmd = c.update(ComposerMsg::Paste("bye\nnow".to_string()));
        assert_eq!(cmd, Some(Cmd::PreventDefault));
        assert_eq!(c.model().text(), "bye\nnow world");
        assert_eq!(c.surface().caret(), 7);
        assert_eq!(c.update(ComposerMsg::Paste(String::new())), None);
    }

    #[test]
    fn test_tab_completes_name() {
        let mut c = composer();
        type_text(&mut c, "hi al");
        let cmd = c.update(ComposerMsg::KeyDown(KeyEvent::plain(Key::Tab)));
        assert_eq!(cmd, Some(Cmd::PreventDefault));
        let parts = c.model().parts();
        assert_eq!(parts[1].kind, PartKind::UserPill);
        assert_eq!(parts[1].text, "Alice");
        assert_eq!(c.model().text(), "hi Alice ");

        // Enter accepts the selected completion
        let cmd = c.update(ComposerMsg::KeyDown(KeyEvent::plain(Key::Enter)));
        assert_eq!(cmd, Some(Cmd::PreventDefault));
        assert!(c.model().auto_complete().is_none());
    }

    #[test]
    fn test_tab_without_match_rings_bell() {
        let mut c = composer();
        type_text(&mut c, "zz");
        let cmd = c.update(ComposerMsg::KeyDown(KeyEvent::plain(Key::Tab)));
        assert_eq!(cmd, Some(Cmd::Batch(vec![Cmd::VisualBell, Cmd::PreventDefault])));
        assert!(c.model().auto_complete().is_none());
        assert_eq!(c.model().text(), "zz");
    }

    #[test]
    fn test_insert_mention_at_caret() {
        let mut c = composer();
        type_text(&mut c, "hi ");
        c.update(ComposerMsg::InsertMention("@bob:example.org".to_string()));
        assert_eq!(c.model().text(), "hi Bob ");
        assert_eq!(c.model().parts()[1].kind, PartKind::UserPill);
        assert_eq!(c.surface().caret(), 7);
        assert!(c.surface().is_focused());
    }

    #[test]
    fn test_insert_quote_at_start() {
        let mut c = composer();
        type_text(&mut c, "reply");
        c.update(ComposerMsg::InsertQuote("one\ntwo".to_string()));
        assert_eq!(c.model().text(), "> one\n> two\n\nreply");
        assert_eq!(c.surface().caret(), 13);
    }

    #[test]
    fn test_change_listener() {
        let mut c = composer();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        c.set_change_listener(Some(Box::new(move |_| seen.set(seen.get() + 1))));
        type_text(&mut c, "a");
        type_text(&mut c, "b");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_selection_queries() {
        let mut c = composer();
        type_text(&mut c, "abc");
        c.surface_mut().set_selection(SurfaceSelection::new(0, 2));
        assert!(!c.is_selection_collapsed());
        c.surface_mut().set_caret(0);
        assert!(c.is_selection_collapsed());
        assert!(c.is_caret_at_start());
    }
}
