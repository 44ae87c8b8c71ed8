//! Rendering of navigation snapshots

pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use aztui_core::model::{Pane, SelectOption};
use aztui_core::store::{ActionDetails, NavigationState};

pub use theme::styles;

/// Everything one frame needs
pub struct View<'a> {
    pub state: &'a NavigationState,
    pub catalog: &'a str,
    pub status: Option<&'a str>,
    pub help_open: bool,
}

/// Key hints for the focused pane
pub fn controls_text(state: &NavigationState) -> &'static str {
    let in_details = state.details.as_ref().is_some_and(|d| d.focused);
    match state.focused_pane {
        Pane::Workspace if in_details => "Enter/→: Open | ←: Up | ↑/↓: Move | Esc: Back to repos | ?: Help | q: Quit",
        Pane::Workspace => "Enter: Run action | →: Browse results | Esc: Back to repos | ↑/↓: Move | ?: Help | q: Quit",
        Pane::Projects => "Enter: Load repos | Tab: Next pane | ↑/↓: Move | r: Refresh | ?: Help | q: Quit",
        Pane::Repositories => "Enter: Open workspace | Tab: Next pane | ↑/↓: Move | ?: Help | q: Quit",
    }
}

pub fn draw(f: &mut Frame, view: &View) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top bar
            Constraint::Min(3),    // Panes
            Constraint::Length(1), // Controls
        ])
        .split(f.area());

    draw_top_bar(f, outer[0], view);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(50),
        ])
        .split(outer[1]);

    let state = view.state;
    draw_projects(f, panes[0], state);
    draw_repositories(f, panes[1], state);
    draw_workspace(f, panes[2], state);

    let controls = Paragraph::new(Line::from(Span::styled(
        format!(" {}", controls_text(state)),
        styles::key_hint(),
    )));
    f.render_widget(controls, outer[2]);

    if view.help_open {
        let area = f.area();
        draw_help(f, area);
    }
}

fn draw_top_bar(f: &mut Frame, area: Rect, view: &View) {
    let mut spans = vec![
        Span::styled(" aztui ", styles::accent_bold()),
        Span::styled(format!("[{}]", view.catalog), styles::text_dim()),
    ];
    let state = view.state;
    if let Some(project) = state.selected_project() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(project.label.clone(), styles::text()));
        if let Some(repo) = state.selected_repository() {
            spans.push(Span::styled(format!(" / {}", repo.label), styles::text()));
        }
    }
    if let Some(status) = view.status {
        spans.push(Span::raw("    "));
        spans.push(Span::styled(status.to_string(), styles::warn()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let title = if focused {
        format!(" ▸ {} ", title)
    } else {
        format!(" {} ", title)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border(focused))
        .title(Span::styled(title, styles::title(focused)))
}

/// Placeholder shown instead of a list
fn placeholder(f: &mut Frame, area: Rect, block: Block, text: &str, error: bool) {
    let style = if error { styles::error() } else { styles::text_muted() };
    let paragraph = Paragraph::new(Span::styled(text.to_string(), style))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn option_items(options: &[SelectOption], chosen: Option<usize>) -> Vec<ListItem<'static>> {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let marker = if chosen == Some(i) {
                Span::styled("● ", styles::chosen())
            } else {
                Span::raw("  ")
            };
            let mut lines = vec![Line::from(vec![marker, Span::styled(option.label.clone(), styles::text())])];
            if !option.description.is_empty() && option.description != option.id {
                lines.push(Line::from(Span::styled(
                    format!("    {}", option.description),
                    styles::text_dim(),
                )));
            }
            ListItem::new(lines)
        })
        .collect()
}

fn draw_list(
    f: &mut Frame,
    area: Rect,
    block: Block,
    options: &[SelectOption],
    cursor: Option<usize>,
    chosen: Option<usize>,
) {
    let list = List::new(option_items(options, chosen))
        .block(block)
        .highlight_style(styles::highlight());
    let mut list_state = ListState::default().with_selected(cursor);
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_projects(f: &mut Frame, area: Rect, state: &NavigationState) {
    let focused = state.focused_pane == Pane::Projects;
    let block = pane_block("Projects", focused);

    if state.projects.is_empty() {
        match (&state.projects_error, state.projects_loading) {
            (_, true) => placeholder(f, area, block, "Loading projects…", false),
            (Some(e), false) => placeholder(f, area, block, e, true),
            (None, false) => placeholder(f, area, block, "No projects", false),
        }
        return;
    }

    let block = match &state.projects_error {
        Some(e) => block.title_bottom(Span::styled(format!(" {} ", e), styles::error())),
        None if state.projects_loading => block.title_bottom(Span::styled(" refreshing… ", styles::text_muted())),
        None => block,
    };
    draw_list(
        f,
        area,
        block,
        &state.projects,
        focused.then_some(state.project_cursor),
        state.selected_project_index,
    );
}

fn draw_repositories(f: &mut Frame, area: Rect, state: &NavigationState) {
    let focused = state.focused_pane == Pane::Repositories;
    let block = pane_block("Repositories", focused);

    if state.selected_project().is_none() {
        placeholder(f, area, block, "Select a project", false);
        return;
    }
    if state.repositories_loading {
        placeholder(f, area, block, "Loading repositories…", false);
        return;
    }
    if state.repositories.is_empty() {
        match &state.repositories_error {
            Some(e) => placeholder(f, area, block, e, true),
            None => placeholder(f, area, block, "No repositories", false),
        }
        return;
    }

    let block = match &state.repositories_error {
        Some(e) => block.title_bottom(Span::styled(format!(" {} ", e), styles::error())),
        None => block,
    };
    draw_list(
        f,
        area,
        block,
        &state.repositories,
        focused.then_some(state.repo_cursor),
        state.selected_repo_index,
    );
}

fn draw_workspace(f: &mut Frame, area: Rect, state: &NavigationState) {
    let focused = state.focused_pane == Pane::Workspace;
    let title = match state.selected_repository() {
        Some(repo) if state.in_workspace => format!("Workspace: {}", repo.label),
        _ => "Workspace".to_string(),
    };
    let block = pane_block(&title, focused);

    if !state.in_workspace {
        placeholder(f, area, block, "Open a repository with Enter", false);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(state.workspace_options.len() as u16 * 2 + 2),
            Constraint::Min(3),
        ])
        .split(area);

    draw_list(f, rows[0], block, &state.workspace_options, state.selected_workspace_index, None);
    draw_details(f, rows[1], state.details.as_ref());
}

fn draw_details(f: &mut Frame, area: Rect, details: Option<&ActionDetails>) {
    let Some(details) = details else {
        let block = pane_block("Details", false);
        placeholder(f, area, block, "Press Enter on an action", false);
        return;
    };
    let block = pane_block(&details.breadcrumb(), details.focused);

    if details.loading {
        placeholder(f, area, block, "Loading…", false);
        return;
    }
    if let Some(e) = &details.error {
        placeholder(f, area, block, e, true);
        return;
    }
    if details.rows.is_empty() {
        placeholder(f, area, block, "Nothing to show", false);
        return;
    }

    let items: Vec<ListItem> = details
        .rows
        .iter()
        .map(|row| {
            ListItem::new(Line::from(vec![
                Span::styled(row.label.clone(), styles::text()),
                Span::raw("  "),
                Span::styled(row.description.clone(), styles::text_dim()),
            ]))
        })
        .collect();
    let list = List::new(items).block(block).highlight_style(styles::highlight());
    let mut list_state = ListState::default().with_selected(details.focused.then_some(details.cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = 52.min(area.width);
    let height = 16.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, popup);

    let entry = |key: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), styles::key_hint()),
            Span::styled(text, styles::text()),
        ])
    };
    let lines = vec![
        entry("Tab", "Next pane"),
        entry("↑/k ↓/j", "Move highlight"),
        entry("PgUp/PgDn", "Move by a page"),
        entry("Enter", "Select / open / run"),
        entry("→/l ←/h", "Browse results / go up"),
        entry("Esc", "Leave the workspace"),
        entry("r", "Reload projects"),
        entry("?", "Toggle this help"),
        entry("q", "Quit"),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border(true))
        .title(Span::styled(" Help ", styles::title(true)));
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use aztui_core::store::SelectionStore;

    use super::*;

    fn rendered(state: &NavigationState, help_open: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| {
                draw(
                    f,
                    &View {
                        state,
                        catalog: "demo",
                        status: None,
                        help_open,
                    },
                )
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_initial_frame_shows_placeholders() {
        let mut store = SelectionStore::new();
        store.begin_load(aztui_core::store::LoadKind::Projects);
        let screen = rendered(store.state(), false);
        assert!(screen.contains("Loading projects"));
        assert!(screen.contains("Select a project"));
        assert!(screen.contains("Enter: Load repos"));
    }

    #[test]
    fn test_workspace_frame_lists_actions() {
        let mut store = SelectionStore::new();
        store.set_projects(vec![SelectOption::new("p1", "Platform", "p1")]);
        store.select_project(0);
        store.set_repositories(vec![SelectOption::new("r1", "gateway", "r1")]);
        store.select_repository(0);
        let options = aztui_core::workspace::options_for(&SelectOption::new("r1", "gateway", "r1"));
        store.enter_workspace(options);

        let screen = rendered(store.state(), false);
        assert!(screen.contains("Workspace: gateway"));
        assert!(screen.contains("Pull Requests"));
        assert!(screen.contains("Esc: Back to repos"));
    }

    #[test]
    fn test_drilled_details_show_breadcrumb() {
        let mut store = SelectionStore::new();
        store.set_projects(vec![SelectOption::new("p1", "Platform", "p1")]);
        store.select_project(0);
        store.set_repositories(vec![SelectOption::new("r1", "gateway", "r1")]);
        store.select_repository(0);
        store.enter_workspace(aztui_core::workspace::options_for(&SelectOption::new("r1", "gateway", "r1")));
        store.show_details(aztui_core::workspace::WorkspaceAction::Pipelines);
        store.set_details_rows(vec![SelectOption::new("160", "gateway", "\\")]);
        store.focus_details(true);
        store.push_detail_level(aztui_core::workspace::DetailLevel::Runs { pipeline_id: 160 });
        store.set_details_rows(vec![SelectOption::new("16005", "20261014.5", "succeeded")]);

        let screen = rendered(store.state(), false);
        assert!(screen.contains("Pipelines › Runs of pipeline #160"));
        assert!(screen.contains("20261014.5"));
        assert!(screen.contains("←: Up"));
    }

    #[test]
    fn test_help_overlay() {
        let screen = rendered(&NavigationState::default(), true);
        assert!(screen.contains("Toggle this help"));
    }
}
