use std::io;
use std::path::PathBuf;

use ratatui::layout::Size;

use crate::io::config_io;
use crate::io::store::TaskFile;
use crate::model::{Document, Item, ItemKind, ViewMode};

use super::command::{Bindings, Command, FOLLOW_UP_WAIT};
use super::editor::{self, Prompted};
use super::keys::{KeyDecoder, read_key, read_key_within};
use super::render;
use super::surface::{Canvas, Surface};
use super::terminal::TerminalSurface;
use super::undo::History;
use super::view::{self, Projection, Projector};

/// The running session: the document, where the cursor is, how it is shown,
/// and the undo log. Nothing else holds any of it.
pub struct App {
    pub document: Document,
    /// Display index into the current projection
    pub cursor: usize,
    pub view_mode: ViewMode,
    pub history: History,
    /// Transient message for the status row, cleared by the next key
    pub status: Option<String>,
    pub should_quit: bool,
    projector: Projector,
    task_file: TaskFile,
    config_path: Option<PathBuf>,
    size: Size,
}

impl App {
    pub fn new(document: Document, task_file: TaskFile, view_mode: ViewMode) -> Self {
        App {
            document,
            cursor: 0,
            view_mode,
            history: History::new(),
            status: None,
            should_quit: false,
            projector: Projector::new(),
            task_file,
            config_path: None,
            size: Size::new(80, 24),
        }
    }

    /// Remember view mode changes in this config file
    pub fn with_config(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Current projection, with the cursor pulled back into range
    pub fn projection(&mut self) -> &Projection {
        let projection = self
            .projector
            .projection(&self.document, self.view_mode, self.size);
        self.cursor = projection.clamp(self.cursor);
        projection
    }

    /// Document index of the item under the cursor
    pub fn selected(&mut self) -> Option<usize> {
        let cursor = self.cursor;
        let index = self.projection().actual_index(cursor)?;
        if index >= self.document.len() {
            tracing::warn!(
                cursor,
                index,
                len = self.document.len(),
                "display mapping points past the document"
            );
            return None;
        }
        Some(index)
    }

    pub fn compose(&mut self) -> Canvas {
        let size = self.size;
        let projection = self
            .projector
            .projection(&self.document, self.view_mode, size);
        self.cursor = projection.clamp(self.cursor);
        render::compose(
            size,
            projection,
            self.cursor,
            self.view_mode,
            self.status.as_deref(),
        )
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.projection().len() {
            self.cursor += 1;
        }
    }

    /// Append a new item. Blank text adds nothing.
    pub fn add_item(&mut self, kind: ItemKind, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.history.record(&self.document, self.cursor);
        let index = self.document.push(Item::new(kind, text));
        self.after_mutation();
        if let Some(row) = self.projection().display_index_of(index) {
            self.cursor = row;
        }
        true
    }

    /// Replace the selected item's text. Blank or unchanged text is ignored.
    pub fn edit_selected(&mut self, text: &str) -> bool {
        let Some(index) = self.selected() else {
            return false;
        };
        let text = text.trim();
        if text.is_empty() || self.document.items()[index].text == text {
            return false;
        }
        self.history.record(&self.document, self.cursor);
        self.document.set_text(index, text);
        self.after_mutation();
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(index) = self.selected() else {
            return false;
        };
        self.history.record(&self.document, self.cursor);
        self.document.remove(index);
        self.after_mutation();
        true
    }

    pub fn cycle_selected(&mut self) -> bool {
        self.change_kind(ItemKind::cycled)
    }

    pub fn toggle_selected(&mut self) -> bool {
        self.change_kind(ItemKind::toggled)
    }

    fn change_kind(&mut self, f: fn(ItemKind) -> ItemKind) -> bool {
        let Some(index) = self.selected() else {
            return false;
        };
        if self.document.items()[index].is_heading() {
            return false;
        }
        self.history.record(&self.document, self.cursor);
        self.document.update_kind(index, f);
        self.after_mutation();
        true
    }

    /// Swap the selected item with its neighbour. Only the flat view has an
    /// unambiguous neighbour.
    pub fn move_selected(&mut self, up: bool) -> bool {
        if self.view_mode != ViewMode::Flat {
            return false;
        }
        let Some(index) = self.selected() else {
            return false;
        };
        let target = if up {
            index.checked_sub(1)
        } else {
            Some(index + 1).filter(|&t| t < self.document.len())
        };
        let Some(target) = target else {
            return false;
        };
        self.history.record(&self.document, self.cursor);
        self.document.swap(index, target);
        self.after_mutation();
        self.cursor = target;
        true
    }

    /// Restore the most recent snapshot. Nothing is recorded, so undo
    /// cannot itself be undone.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.document.replace_all(snapshot.items);
        self.cursor = snapshot.cursor;
        self.after_mutation();
        true
    }

    /// Switch to the next view mode and remember it in the config file
    pub fn cycle_view(&mut self) {
        self.view_mode = self.view_mode.next();
        self.projector.invalidate();
        self.projection();
        tracing::debug!(mode = ?self.view_mode, "view changed");
        if let Some(path) = &self.config_path
            && let Err(e) = config_io::write_view_mode(path, self.view_mode)
        {
            tracing::warn!(error = %e, "could not remember view mode");
        }
    }

    /// Write the document out. Failures are logged and shown, never fatal.
    pub fn persist(&mut self) {
        if let Err(e) = self.task_file.save(&self.document) {
            tracing::error!(error = %e, "save failed");
            self.status = Some(format!("save failed: {}", e));
        }
    }

    fn after_mutation(&mut self) {
        self.persist();
        self.projector.invalidate();
        self.projection();
    }

    /// Show the text editor over the current screen
    fn prompt<S: Surface>(
        &self,
        surface: &mut S,
        decoder: &mut KeyDecoder,
        label: &str,
        initial: &str,
    ) -> io::Result<Prompted> {
        let document = &self.document;
        let mode = self.view_mode;
        let cursor = self.cursor;
        let status = self.status.as_deref();
        editor::prompt(surface, decoder, label, initial, |size| {
            let projection = view::project(document.items(), mode, view::body_height(size));
            render::compose(size, &projection, cursor, mode, status)
        })
    }

    fn add_with_prompt<S: Surface>(
        &mut self,
        surface: &mut S,
        decoder: &mut KeyDecoder,
        kind: ItemKind,
    ) -> io::Result<()> {
        let label = if kind.is_heading() {
            "New heading:"
        } else {
            "New task:"
        };
        let prompted = self.prompt(surface, decoder, label, "")?;
        if prompted.interrupted {
            self.should_quit = true;
        } else {
            self.add_item(kind, &prompted.text);
        }
        Ok(())
    }

    fn edit_with_prompt<S: Surface>(
        &mut self,
        surface: &mut S,
        decoder: &mut KeyDecoder,
    ) -> io::Result<()> {
        let Some(index) = self.selected() else {
            return Ok(());
        };
        let item = &self.document.items()[index];
        let label = if item.is_heading() {
            "Edit heading:"
        } else {
            "Edit task:"
        };
        let initial = item.text.clone();
        let prompted = self.prompt(surface, decoder, label, &initial)?;
        if prompted.interrupted {
            self.should_quit = true;
        } else {
            self.edit_selected(&prompted.text);
        }
        Ok(())
    }

    pub fn execute<S: Surface>(
        &mut self,
        command: Command,
        surface: &mut S,
        decoder: &mut KeyDecoder,
    ) -> io::Result<()> {
        match command {
            Command::CursorUp => self.cursor_up(),
            Command::CursorDown => self.cursor_down(),
            Command::AddTask => self.add_with_prompt(surface, decoder, ItemKind::Todo)?,
            Command::AddHeading => self.add_with_prompt(surface, decoder, ItemKind::Heading)?,
            Command::Edit => self.edit_with_prompt(surface, decoder)?,
            Command::Delete => {
                self.delete_selected();
            }
            Command::CycleState => {
                self.cycle_selected();
            }
            Command::ToggleState => {
                self.toggle_selected();
            }
            Command::CycleView => self.cycle_view(),
            Command::Undo => {
                self.undo();
            }
            Command::MoveUp => {
                self.move_selected(true);
            }
            Command::MoveDown => {
                self.move_selected(false);
            }
            Command::Quit => self.should_quit = true,
        }
        Ok(())
    }
}

/// Read, dispatch and redraw until the session ends
fn event_loop<S: Surface>(app: &mut App, surface: &mut S) -> io::Result<()> {
    let mut decoder = KeyDecoder::new();
    let mut bindings = Bindings::new();
    while !app.should_quit {
        app.set_size(surface.size()?);
        let canvas = app.compose();
        surface.present(&canvas)?;

        let key = if bindings.awaiting_follow_up() {
            match read_key_within(surface, &mut decoder, FOLLOW_UP_WAIT)? {
                Some(key) => key,
                None => {
                    bindings.expire();
                    continue;
                }
            }
        } else {
            read_key(surface, &mut decoder)?
        };
        app.status = None;
        let Some(command) = bindings.resolve(key) else {
            continue;
        };
        tracing::debug!(?key, ?command, mutation = command.is_mutation(), "dispatch");
        app.execute(command, surface, &mut decoder)?;
    }
    Ok(())
}

/// Run a session on `surface`. The document is saved once more on the way
/// out, whether the loop ended by quitting, by interrupt, or with an error.
pub fn run_session<S: Surface>(app: &mut App, surface: &mut S) -> io::Result<()> {
    let result = event_loop(app, surface);
    app.persist();
    tracing::info!(items = app.document.len(), "session ended");
    result
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_io::config_path();
    let settings = config_io::load_or_init(&config_path);
    let task_file = TaskFile::new(settings.task_file());
    let document = task_file.load()?;
    tracing::info!(
        path = %task_file.path().display(),
        items = document.len(),
        mode = ?settings.view_mode,
        "session started"
    );

    let mut app = App::new(document, task_file, settings.view_mode).with_config(config_path);

    let mut terminal = TerminalSurface::open()?;
    let result = run_session(&mut app, &mut terminal);
    let closed = terminal.close();
    result?;
    closed?;
    Ok(())
}
