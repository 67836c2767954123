//! Application state and event loop

use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::Span,
    widgets::{Paragraph, Widget},
    DefaultTerminal, Frame,
};

use crate::services::{
    Aggregator, Config, FilterEngine, HttpTaskService, MonitorEvent, TaskHandle, TaskMonitor,
    TaskService,
};
use crate::types::{ChartData, FilterState, Task, TransactionRecord};

use super::theme::Theme;
use super::widgets::{
    data_table::DataTable,
    filter_bar::{FilterField, FilterOptions},
    help::HelpPopup,
    spinner::{LoadingStage, Spinner},
    tabs::Tab,
    task_details::{table_visible_rows, DetailsData, TaskDetailsView},
    task_list::{scroll_for, task_list_visible_rows, TaskListView},
};

/// Which page the app opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPage {
    TaskList,
    Task(u64),
}

/// Monitoring session the event loop should open next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    WatchList,
    WatchTask(u64),
}

/// State of the task details page
pub struct DetailsState {
    task_id: u64,
    task: Option<Task>,
    records: Option<Arc<Vec<TransactionRecord>>>,
    options: FilterOptions,
    filter: FilterState,
    charts: ChartData,
    tab: Tab,
    cursor: Option<usize>,
    pointer: Option<(u16, u16)>,
    table_scroll: usize,
    error: Option<String>,
}

impl DetailsState {
    fn new(task_id: u64, task: Option<Task>) -> Self {
        Self {
            task_id,
            task,
            records: None,
            options: FilterOptions::from_records(&[]),
            filter: FilterState::default(),
            charts: ChartData::default(),
            tab: Tab::default(),
            cursor: None,
            pointer: None,
            table_scroll: 0,
            error: None,
        }
    }

    /// Records passing the current filter, in fetch order
    fn filtered(&self) -> Vec<&TransactionRecord> {
        self.records
            .as_deref()
            .map(|records| FilterEngine::apply(records, &self.filter))
            .unwrap_or_default()
    }

    /// Rebuild the aggregates after records or filter changed
    fn recompute(&mut self) {
        let charts = Aggregator::chart_data(&self.filtered());
        log::debug!(
            "task {}: {} records after filter",
            self.task_id,
            charts.summary.record_count
        );
        self.charts = charts;
        self.table_scroll = 0;
        let points = self.charts.time_series.len();
        self.cursor = self
            .cursor
            .filter(|_| points > 0)
            .map(|c| c.min(points - 1));
    }

    fn set_records(&mut self, records: Arc<Vec<TransactionRecord>>) {
        self.options = FilterOptions::from_records(&records);
        self.records = Some(records);
        self.recompute();
    }

    fn has_data(&self) -> bool {
        self.records.is_some()
    }

    fn step_cursor(&mut self, forward: bool) {
        let len = self.charts.time_series.len();
        if len == 0 {
            return;
        }
        self.pointer = None;
        self.cursor = Some(match (self.cursor, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1).min(len - 1),
            (Some(i), false) => i.saturating_sub(1),
        });
    }
}

/// Current page
pub enum Page {
    TaskList,
    TaskDetails(Box<DetailsState>),
}

/// Main application
pub struct App {
    page: Page,
    tasks: Vec<Task>,
    tasks_loaded: bool,
    list_error: Option<String>,
    selected: usize,
    list_scroll: usize,
    generation: u64,
    request: Option<Request>,
    should_quit: bool,
    show_help: bool,
    spinner_frame: usize,
    terminal_height: u16,
    theme: Theme,
}

/// Fold a fresh task list into the displayed one. Order follows `fresh`;
/// a task already settled keeps its status if the list reports otherwise.
pub fn merge_tasks(current: &mut Vec<Task>, fresh: Vec<Task>) {
    let merged = fresh
        .into_iter()
        .map(|task| match current.iter().find(|t| t.id == task.id) {
            Some(known) => {
                let mut known = known.clone();
                known.merge(task);
                known
            }
            None => task,
        })
        .collect();
    *current = merged;
}

impl App {
    pub fn new(start: StartPage, theme: Theme) -> Self {
        let (page, request) = match start {
            StartPage::TaskList => (Page::TaskList, Request::WatchList),
            StartPage::Task(id) => (
                Page::TaskDetails(Box::new(DetailsState::new(id, None))),
                Request::WatchTask(id),
            ),
        };
        Self {
            page,
            tasks: Vec::new(),
            tasks_loaded: false,
            list_error: None,
            selected: 0,
            list_scroll: 0,
            generation: 0,
            request: Some(request),
            should_quit: false,
            show_help: false,
            spinner_frame: 0,
            terminal_height: 24,
            theme,
        }
    }

    /// Session the loop must open, if any
    pub fn take_request(&mut self) -> Option<Request> {
        self.request.take()
    }

    /// Record the session whose events are now accepted
    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn set_terminal_height(&mut self, height: u16) {
        self.terminal_height = height;
    }

    /// Apply a monitor event; events from superseded sessions are dropped
    pub fn apply(&mut self, event: MonitorEvent) {
        if event.generation() != self.generation {
            log::debug!(
                "dropping event from session {} (current {})",
                event.generation(),
                self.generation
            );
            return;
        }

        match event {
            MonitorEvent::TaskList { tasks, .. } => {
                if !matches!(self.page, Page::TaskList) {
                    return;
                }
                let selected_id = self.tasks.get(self.selected).map(|t| t.id);
                merge_tasks(&mut self.tasks, tasks);
                self.tasks_loaded = true;
                self.list_error = None;
                self.selected = selected_id
                    .and_then(|id| self.tasks.iter().position(|t| t.id == id))
                    .unwrap_or(0)
                    .min(self.tasks.len().saturating_sub(1));
                self.clamp_list_scroll();
            }
            MonitorEvent::Snapshot(snapshot) => {
                let Page::TaskDetails(details) = &mut self.page else {
                    return;
                };
                if snapshot.task.id != details.task_id {
                    return;
                }
                match details.task.as_mut() {
                    Some(known) => {
                        known.merge(snapshot.task);
                    }
                    None => details.task = Some(snapshot.task),
                }
                details.error = None;
                if let (Some(records), false) = (snapshot.records, details.has_data()) {
                    log::info!("task {}: {} records loaded", details.task_id, records.len());
                    details.set_records(records);
                }
            }
            MonitorEvent::Error { message, .. } => match &mut self.page {
                Page::TaskList => self.list_error = Some(message),
                Page::TaskDetails(details) => details.error = Some(message),
            },
        }
    }

    /// Handle keyboard, mouse and resize events
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    self.should_quit = true;
                    return;
                }
                if self.show_help {
                    if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                        self.show_help = false;
                    }
                    return;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                    KeyCode::Char('?') => self.show_help = true,
                    code if matches!(self.page, Page::TaskList) => self.handle_list_key(code),
                    code => self.handle_details_key(code),
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {
                if let Page::TaskDetails(details) = &mut self.page {
                    details.pointer = Some((mouse.column, mouse.row));
                    details.cursor = None;
                }
            }
            Event::Resize(_, height) => {
                self.terminal_height = height;
                self.clamp_list_scroll();
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                self.clamp_list_scroll();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
                self.clamp_list_scroll();
            }
            KeyCode::Enter => {
                if let Some(task) = self.tasks.get(self.selected) {
                    let id = task.id;
                    let details = DetailsState::new(id, Some(task.clone()));
                    self.page = Page::TaskDetails(Box::new(details));
                    self.request = Some(Request::WatchTask(id));
                }
            }
            _ => {}
        }
    }

    fn handle_details_key(&mut self, code: KeyCode) {
        let visible_rows = table_visible_rows(self.terminal_height);
        let Page::TaskDetails(details) = &mut self.page else {
            return;
        };

        match code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.page = Page::TaskList;
                self.request = Some(Request::WatchList);
            }
            KeyCode::Tab => details.tab = details.tab.next(),
            KeyCode::BackTab => details.tab = details.tab.prev(),
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                    details.tab = tab;
                }
            }
            KeyCode::Char(c @ ('c' | 'b' | 'p' | 'y')) if details.has_data() => {
                let field = match c {
                    'c' => FilterField::Category,
                    'b' => FilterField::Brand,
                    'p' => FilterField::Platform,
                    _ => FilterField::Year,
                };
                field.advance(&mut details.filter, &details.options);
                details.recompute();
            }
            KeyCode::Char('r') if details.has_data() => {
                if !details.filter.is_wildcard() {
                    details.filter = FilterState::default();
                    details.recompute();
                }
            }
            KeyCode::Left | KeyCode::Char('h') if details.tab == Tab::Trend => {
                details.step_cursor(false);
            }
            KeyCode::Right | KeyCode::Char('l') if details.tab == Tab::Trend => {
                details.step_cursor(true);
            }
            KeyCode::Up | KeyCode::Char('k') if details.tab == Tab::Records => {
                details.table_scroll = details.table_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') if details.tab == Tab::Records => {
                let total = details.filtered().len();
                let max = DataTable::max_scroll(total, visible_rows);
                details.table_scroll = (details.table_scroll + 1).min(max);
            }
            _ => {}
        }
    }

    fn clamp_list_scroll(&mut self) {
        let visible = task_list_visible_rows(self.terminal_height);
        self.list_scroll = scroll_for(self.selected, self.list_scroll, visible);
    }

    /// Advance the spinner animation
    pub fn tick(&mut self) {
        self.spinner_frame = Spinner::next_frame(self.spinner_frame);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.page {
            Page::TaskList if !self.tasks_loaded && self.list_error.is_none() => {
                Spinner::new(self.spinner_frame, LoadingStage::Tasks, self.theme)
                    .render(area, buf);
            }
            Page::TaskList => {
                TaskListView::new(&self.tasks, self.selected, self.theme)
                    .with_scroll(self.list_scroll)
                    .with_loading(!self.tasks_loaded)
                    .with_error(self.list_error.as_deref())
                    .render(area, buf);
            }
            Page::TaskDetails(details) => match &details.task {
                None => {
                    Spinner::new(self.spinner_frame, LoadingStage::Task, self.theme)
                        .render(area, buf);
                    if let Some(error) = &details.error {
                        Paragraph::new(Span::styled(
                            error.as_str(),
                            Style::default().fg(self.theme.error()),
                        ))
                        .alignment(Alignment::Center)
                        .render(
                            Rect {
                                y: area.y + area.height.saturating_sub(2),
                                height: area.height.min(1),
                                ..area
                            },
                            buf,
                        );
                    }
                }
                Some(task) => {
                    let filtered = details.filtered();
                    let data = details.records.as_ref().map(|records| DetailsData {
                        filter: &details.filter,
                        filtered: &filtered,
                        total: records.len(),
                        charts: &details.charts,
                    });
                    TaskDetailsView::new(task, self.theme)
                        .with_data(data)
                        .with_tab(details.tab)
                        .with_hover(details.cursor, details.pointer)
                        .with_table_scroll(details.table_scroll)
                        .with_spinner(self.spinner_frame)
                        .with_error(details.error.as_deref())
                        .render(area, buf);
                }
            },
        }

        if self.show_help {
            let popup_area = HelpPopup::centered_area(area);
            HelpPopup::new(self.theme).render(popup_area, buf);
        }
    }
}

/// Run the TUI against the configured task service
pub fn run(config: &Config, start: StartPage) -> anyhow::Result<()> {
    let service = Arc::new(HttpTaskService::new(
        &config.api_url,
        config.request_timeout(),
    )?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    // Monitor sessions are spawned onto this runtime
    let _guard = runtime.enter();
    let monitor =
        TaskMonitor::new(service).with_intervals(config.task_interval(), config.list_interval());

    // Probe before raw mode
    let theme = Theme::resolve(config.theme);
    let mut terminal = ratatui::init();
    let result = crossterm::execute!(io::stdout(), EnableMouseCapture)
        .map_err(anyhow::Error::from)
        .and_then(|()| run_app(&mut terminal, &monitor, App::new(start, theme)));
    let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

fn run_app<S: TaskService>(
    terminal: &mut DefaultTerminal,
    monitor: &TaskMonitor<S>,
    mut app: App,
) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<MonitorEvent>();
    let mut session: Option<TaskHandle> = None;
    app.set_terminal_height(terminal.size()?.height);

    loop {
        if let Some(request) = app.take_request() {
            let tx = event_tx.clone();
            let sink = move |event: MonitorEvent| {
                let _ = tx.send(event);
            };
            let handle = match request {
                Request::WatchList => monitor.watch_list(sink),
                Request::WatchTask(id) => monitor.start(id, sink),
            };
            app.set_generation(handle.generation());
            if let Some(previous) = session.replace(handle) {
                log::debug!("session {} superseded", previous.generation());
            }
        }

        while let Ok(event) = event_rx.try_recv() {
            app.apply(event);
        }

        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // 100ms timeout keeps the spinner moving and drains monitor events
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MonitorState, Snapshot};
    use crate::types::{dates, DataSource, FilterParams, Platform, TaskStatus};
    use crossterm::event::{KeyEvent, MouseEvent};

    fn task(id: u64, status: TaskStatus) -> Task {
        Task {
            id,
            name: format!("Task {id}"),
            status,
            created_at: dates::parse_datetime("2025-01-01T00:00:00").unwrap(),
            updated_at: dates::parse_datetime("2025-01-01T00:00:00").unwrap(),
            filter_params: FilterParams::default(),
        }
    }

    fn record(category: &str, platform: Platform, date: &str) -> TransactionRecord {
        TransactionRecord {
            source: DataSource::SourceA,
            category: category.to_string(),
            brand: "Sony".to_string(),
            price: 10.0,
            quantity: 1,
            platform,
            purchase_date: dates::parse_datetime(date).unwrap(),
            rating: None,
            location: None,
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn list_event(generation: u64, tasks: Vec<Task>) -> MonitorEvent {
        MonitorEvent::TaskList { generation, tasks }
    }

    fn snapshot(
        generation: u64,
        task: Task,
        records: Option<Vec<TransactionRecord>>,
    ) -> MonitorEvent {
        let state = match task.status {
            TaskStatus::Completed => MonitorState::Completed,
            TaskStatus::Failed => MonitorState::Failed,
            _ => MonitorState::Polling,
        };
        MonitorEvent::Snapshot(Snapshot {
            generation,
            state,
            task,
            records: records.map(Arc::new),
        })
    }

    /// App on the list page with session 1 accepted and `tasks` loaded
    fn list_app(tasks: Vec<Task>) -> App {
        let mut app = App::new(StartPage::TaskList, Theme::Dark);
        assert_eq!(app.take_request(), Some(Request::WatchList));
        app.set_generation(1);
        app.apply(list_event(1, tasks));
        app
    }

    /// App on a completed task's details page with records loaded
    fn details_app() -> App {
        let mut app = App::new(StartPage::Task(9), Theme::Dark);
        assert_eq!(app.take_request(), Some(Request::WatchTask(9)));
        app.set_generation(1);
        app.apply(snapshot(
            1,
            task(9, TaskStatus::Completed),
            Some(vec![
                record("Electronics", Platform::Online, "2021-05-01"),
                record("Books", Platform::Store, "2021-06-15"),
                record("Books", Platform::Online, "2022-01-03"),
            ]),
        ));
        app
    }

    fn details(app: &App) -> &DetailsState {
        match &app.page {
            Page::TaskDetails(d) => d,
            Page::TaskList => panic!("expected details page"),
        }
    }

    // ========== merge_tasks ==========

    #[test]
    fn test_merge_tasks_follows_fresh_order() {
        let mut current = vec![task(1, TaskStatus::Pending)];
        merge_tasks(
            &mut current,
            vec![task(2, TaskStatus::Pending), task(1, TaskStatus::InProgress)],
        );
        assert_eq!(current.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(current[1].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_merge_tasks_terminal_never_regresses() {
        let mut current = vec![task(1, TaskStatus::Completed)];
        merge_tasks(&mut current, vec![task(1, TaskStatus::InProgress)]);
        assert_eq!(current[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_merge_tasks_drops_missing() {
        let mut current = vec![task(1, TaskStatus::Pending), task(2, TaskStatus::Pending)];
        merge_tasks(&mut current, vec![task(2, TaskStatus::Pending)]);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, 2);
    }

    // ========== monitor events ==========

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut app = list_app(vec![task(1, TaskStatus::Pending)]);
        app.set_generation(2);
        app.apply(list_event(1, vec![task(5, TaskStatus::Pending)]));
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].id, 1);
    }

    #[test]
    fn test_list_event_keeps_selected_task() {
        let mut app = list_app(vec![task(3, TaskStatus::Pending), task(2, TaskStatus::Pending)]);
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected, 1);
        // A new task appears on top; selection stays on task 2
        app.apply(list_event(
            1,
            vec![
                task(4, TaskStatus::Pending),
                task(3, TaskStatus::Pending),
                task(2, TaskStatus::Pending),
            ],
        ));
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_list_error_is_shown_and_cleared() {
        let mut app = list_app(vec![]);
        app.apply(MonitorEvent::Error {
            generation: 1,
            message: "failed to load tasks".into(),
        });
        assert_eq!(app.list_error.as_deref(), Some("failed to load tasks"));
        app.apply(list_event(1, vec![task(1, TaskStatus::Pending)]));
        assert!(app.list_error.is_none());
    }

    #[test]
    fn test_snapshot_for_other_task_ignored() {
        let mut app = App::new(StartPage::Task(9), Theme::Dark);
        app.set_generation(1);
        app.apply(snapshot(1, task(8, TaskStatus::Pending), None));
        assert!(details(&app).task.is_none());
    }

    #[test]
    fn test_snapshot_loads_records_and_charts() {
        let app = details_app();
        let d = details(&app);
        assert_eq!(d.task.as_ref().map(|t| t.status), Some(TaskStatus::Completed));
        assert_eq!(d.charts.summary.record_count, 3);
        assert_eq!(d.charts.time_series.len(), 3);
        assert_eq!(d.options.brands, vec!["Sony"]);
    }

    #[test]
    fn test_completed_without_records_keeps_status_and_error() {
        let mut app = App::new(StartPage::Task(9), Theme::Dark);
        app.set_generation(1);
        app.apply(snapshot(1, task(9, TaskStatus::InProgress), None));
        app.apply(snapshot(1, task(9, TaskStatus::Completed), None));
        app.apply(MonitorEvent::Error {
            generation: 1,
            message: "failed to load task data".into(),
        });

        let d = details(&app);
        assert_eq!(d.task.as_ref().map(|t| t.status), Some(TaskStatus::Completed));
        assert!(!d.has_data());
        assert_eq!(d.error.as_deref(), Some("failed to load task data"));

        app.apply(snapshot(
            1,
            task(9, TaskStatus::Completed),
            Some(vec![record("Books", Platform::Store, "2021-06-15")]),
        ));
        let d = details(&app);
        assert!(d.has_data());
        assert!(d.error.is_none());
    }

    // ========== navigation ==========

    #[test]
    fn test_enter_opens_details_and_requests_watch() {
        let mut app = list_app(vec![task(3, TaskStatus::Pending), task(2, TaskStatus::Completed)]);
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.take_request(), Some(Request::WatchTask(2)));
        assert_eq!(details(&app).task_id, 2);
        assert!(details(&app).task.is_some());
    }

    #[test]
    fn test_esc_returns_to_list() {
        let mut app = details_app();
        app.handle_event(key(KeyCode::Esc));
        assert!(matches!(app.page, Page::TaskList));
        assert_eq!(app.take_request(), Some(Request::WatchList));
        assert!(!app.should_quit());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = list_app(vec![]);
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());

        let mut app = details_app();
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_selection_bounds() {
        let mut app = list_app(vec![task(1, TaskStatus::Pending), task(2, TaskStatus::Pending)]);
        app.handle_event(key(KeyCode::Up));
        assert_eq!(app.selected, 0);
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_help_toggle_swallows_keys() {
        let mut app = list_app(vec![task(1, TaskStatus::Pending)]);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('q')));
        assert!(!app.should_quit());
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[test]
    fn test_tab_keys() {
        let mut app = details_app();
        app.handle_event(key(KeyCode::Char('4')));
        assert_eq!(details(&app).tab, Tab::Platforms);
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(details(&app).tab, Tab::Records);
        app.handle_event(key(KeyCode::BackTab));
        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(details(&app).tab, Tab::Categories);
    }

    // ========== filters ==========

    #[test]
    fn test_filter_keys_recompute_charts() {
        let mut app = details_app();
        // Online → Store
        app.handle_event(key(KeyCode::Char('p')));
        assert_eq!(details(&app).charts.summary.record_count, 2);
        app.handle_event(key(KeyCode::Char('p')));
        assert_eq!(details(&app).charts.summary.record_count, 1);

        // Year cycles from 2020; 2021 keeps only the Store record from June
        app.handle_event(key(KeyCode::Char('y')));
        assert_eq!(details(&app).charts.summary.record_count, 0);
        app.handle_event(key(KeyCode::Char('y')));
        assert_eq!(details(&app).charts.summary.record_count, 1);

        app.handle_event(key(KeyCode::Char('r')));
        assert!(details(&app).filter.is_wildcard());
        assert_eq!(details(&app).charts.summary.record_count, 3);
    }

    #[test]
    fn test_filter_keys_ignored_before_records() {
        let mut app = App::new(StartPage::Task(9), Theme::Dark);
        app.set_generation(1);
        app.apply(snapshot(1, task(9, TaskStatus::InProgress), None));
        app.handle_event(key(KeyCode::Char('c')));
        assert!(details(&app).filter.is_wildcard());
    }

    // ========== hover ==========

    #[test]
    fn test_arrow_keys_step_cursor_on_trend() {
        let mut app = details_app();
        app.handle_event(key(KeyCode::Right));
        assert_eq!(details(&app).cursor, None, "only active on the trend tab");

        app.handle_event(key(KeyCode::Char('2')));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(details(&app).cursor, Some(0));
        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(details(&app).cursor, Some(2));
        app.handle_event(key(KeyCode::Left));
        assert_eq!(details(&app).cursor, Some(1));
    }

    #[test]
    fn test_mouse_move_sets_pointer() {
        let mut app = details_app();
        app.handle_event(key(KeyCode::Char('2')));
        app.handle_event(key(KeyCode::Right));
        app.handle_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 30,
            row: 12,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(details(&app).pointer, Some((30, 12)));
        assert_eq!(details(&app).cursor, None);
    }

    // ========== rendering ==========

    #[test]
    fn test_render_list_and_details() {
        let app = list_app(vec![task(1, TaskStatus::InProgress)]);
        let area = Rect::new(0, 0, 120, 20);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text: String = (0..20)
            .map(|y| (0..120).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect();
        assert!(text.contains("IN PROGRESS"));

        let app = details_app();
        let area = Rect::new(0, 0, 140, 40);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text: String = (0..40)
            .map(|y| (0..140).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect();
        assert!(text.contains("COMPLETED"));
        assert!(text.contains("3/3 records"));
    }
}
