use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, info};

use aztui_core::catalog::RemoteCatalog;
use aztui_core::focus::{Confirmed, FocusController, NavCommand, WorkspaceFocusPolicy};
use aztui_core::orchestrator::{Applied, LoadOrchestrator, LoadOutcome};
use aztui_core::store::SelectionStore;

use crate::autodetect::AutoSelect;
use crate::keymap::{KeyAction, map_key};
use crate::ui::{self, View};

/// One interactive session: the controller plus the channel its loads report on
pub struct App {
    controller: FocusController,
    outcomes: mpsc::UnboundedReceiver<LoadOutcome>,
    auto_select: Option<AutoSelect>,
    catalog_name: &'static str,
    status: Option<String>,
    help_open: bool,
}

impl App {
    pub fn new(catalog: Arc<dyn RemoteCatalog>, policy: WorkspaceFocusPolicy, status: Option<String>) -> Self {
        let catalog_name = catalog.name();
        let (orchestrator, outcomes) = LoadOrchestrator::channel(catalog);
        Self {
            controller: FocusController::new(SelectionStore::new(), orchestrator, policy),
            outcomes,
            auto_select: None,
            catalog_name,
            status,
            help_open: false,
        }
    }

    pub fn with_auto_select(mut self, auto_select: Option<AutoSelect>) -> Self {
        self.auto_select = auto_select;
        self
    }

    /// Kick off the initial project load
    pub fn start(&mut self) {
        self.controller.request_projects();
    }

    /// Apply every outcome that has arrived since the last frame
    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.apply(outcome);
        }
    }

    fn apply(&mut self, outcome: LoadOutcome) {
        let applied = self.controller.apply_load(outcome);
        if applied != Applied::Committed {
            return;
        }
        if let Some(auto) = self.auto_select.as_mut() {
            auto.advance(&mut self.controller);
            if auto.is_done() {
                self.auto_select = None;
            }
        }
    }

    /// Returns `true` when the session should end
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let Some(action) = map_key(code, modifiers) else {
            return false;
        };

        if self.help_open {
            match action {
                KeyAction::ToggleHelp | KeyAction::Nav(NavCommand::Back) => {
                    self.help_open = false
                }
                KeyAction::Quit => return true,
                _ => {}
            }
            return false;
        }

        match action {
            KeyAction::Quit => return true,
            KeyAction::ToggleHelp => self.help_open = true,
            KeyAction::Refresh => {
                let generation = self.controller.request_projects();
                info!(generation, "refreshing projects");
            }
            KeyAction::Nav(command) => {
                // manual navigation takes over from autodetection
                self.auto_select = None;
                if let Some(confirmed) = self.controller.handle(command) {
                    self.note(&confirmed);
                }
            }
        }
        false
    }

    fn note(&mut self, confirmed: &Confirmed) {
        debug!(?confirmed, "confirmed");
        match confirmed {
            Confirmed::ActionInvoked(invocation) => {
                self.status = Some(format!(
                    "{} for {}",
                    invocation.action.label(),
                    invocation.repository_name
                ));
            }
            Confirmed::DetailsOpened { .. } => {
                self.status = self
                    .controller
                    .state()
                    .details
                    .as_ref()
                    .map(|details| details.breadcrumb());
            }
            Confirmed::ProjectSelected { .. } | Confirmed::WorkspaceEntered { .. } => {}
        }
    }

    pub fn view(&self) -> View<'_> {
        View {
            state: self.controller.state(),
            catalog: self.catalog_name,
            status: self.status.as_deref(),
            help_open: self.help_open,
        }
    }
}

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn run(mut app: App) -> anyhow::Result<()> {
    let mut terminal = setup_terminal()?;
    app.start();
    let result = event_loop(&mut terminal, &mut app);
    restore_terminal(terminal)?;
    info!("session ended");
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> anyhow::Result<()> {
    loop {
        app.drain_outcomes();
        terminal.draw(|f| ui::draw(f, &app.view()))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let CEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        if app.handle_key(code, modifiers) {
            return Ok(());
        }
    }
}
