use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::components::{BlogFormInput, FormEvent, KeyResult, SearchEvent, SearchInput};
use blogdesk::blog::BlogForm;
use blogdesk::browser::BlogBrowser;
use blogdesk::config::Config;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Search,
  Create,
}

/// Why the event loop woke up
enum Wake {
  Input(Option<Event>),
  Data,
}

/// Main application state
pub struct App {
  browser: BlogBrowser,
  config: Config,
  mode: Mode,
  search: SearchInput,
  form: BlogFormInput,
  list_state: ListState,
  detail_scroll: u16,
  /// One-shot message for the status bar, cleared on the next key
  status: Option<String>,
  /// Title of the blog being created, while its request runs
  publishing: Option<String>,
  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, browser: BlogBrowser) -> Self {
    // Replaced by the event handler's sender in `run`
    let (event_tx, _rx) = mpsc::unbounded_channel();

    Self {
      browser,
      config,
      mode: Mode::Normal,
      search: SearchInput::new(),
      form: BlogFormInput::new(),
      list_state: ListState::default(),
      detail_scroll: 0,
      status: None,
      publishing: None,
      event_tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Redraw on input or when the cache pushes new data
      let next = tokio::select! {
        event = events.next() => Wake::Input(event),
        _ = self.browser.changed() => Wake::Data,
      };

      match next {
        Wake::Data => self.sync_selection(),
        Wake::Input(Some(Event::Key(key))) => self.handle_key(key),
        Wake::Input(Some(Event::Published(result))) => self.published(result),
        Wake::Input(Some(Event::Resize | Event::Tick)) => {}
        Wake::Input(None) => self.should_quit = true,
      }
    }

    Ok(())
  }

  /// Create the blog on a background task; the form shows progress meanwhile
  fn publish(&mut self, form: BlogForm) {
    self.form.set_submitting();
    self.publishing = Some(form.title.clone());

    let publisher = self.browser.publisher();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let result = publisher.publish(&form).await;
      let _ = tx.send(Event::Published(result));
    });
  }

  fn published(&mut self, result: blogdesk::Result<String>) {
    let title = self.publishing.take().unwrap_or_default();
    match result {
      Ok(id) => {
        debug!(%id, "Published from form");
        self.browser.select_blog(&id);
        self.mode = Mode::Normal;
        self.form = BlogFormInput::new();
        self.detail_scroll = 0;
        self.status = Some(format!("Published \"{}\"", title));
        self.sync_selection();
      }
      Err(e) => self.form.set_error(e.to_string()),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.status = None;

    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Search => self.handle_search_key(key),
      Mode::Create => self.handle_create_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    if let KeyResult::Event(event) = self.search.handle_key(key) {
      self.mode = Mode::Search;
      self.apply_search(event);
      return;
    }

    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Enter => self.enter_selected(),
      KeyCode::Esc => {
        if self.browser.is_detail_focused() {
          self.browser.back_to_list();
        } else if !self.browser.search_query().is_empty() {
          self.browser.set_search_query("");
        }
      }
      KeyCode::Char('n') => {
        self.form = BlogFormInput::new();
        self.mode = Mode::Create;
      }
      KeyCode::Char('r') => {
        self.browser.refresh();
        self.status = Some("Refreshing...".to_string());
      }
      _ => {}
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    if let KeyResult::Event(event) = self.search.handle_key(key) {
      self.apply_search(event);
    }
    if !self.search.is_active() {
      self.mode = Mode::Normal;
    }
  }

  fn apply_search(&mut self, event: SearchEvent) {
    match event {
      SearchEvent::Changed(query) => {
        self.browser.set_search_query(query);
        self.list_state.select(Some(0));
      }
      SearchEvent::Submitted => {}
    }
  }

  fn handle_create_key(&mut self, key: KeyEvent) {
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submit(form)) => self.publish(form),
      KeyResult::Event(FormEvent::Cancel) => self.mode = Mode::Normal,
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
  }

  fn move_selection(&mut self, delta: i32) {
    if self.browser.is_detail_focused() {
      self.detail_scroll = if delta < 0 {
        self.detail_scroll.saturating_sub(1)
      } else {
        self.detail_scroll.saturating_add(1)
      };
      return;
    }

    let len = self.browser.filtered_blogs().len();
    if len > 0 {
      let current = self.list_state.selected().unwrap_or(0) as i32;
      let next = (current + delta).rem_euclid(len as i32) as usize;
      self.list_state.select(Some(next));
    }
  }

  fn enter_selected(&mut self) {
    if self.browser.is_detail_focused() {
      return;
    }
    let Some(idx) = self.list_state.selected() else {
      return;
    };
    if let Some(blog) = self.browser.filtered_blogs().get(idx) {
      if self.browser.selected_id() != Some(blog.id.as_str()) {
        self.detail_scroll = 0;
      }
      self.browser.select_blog(&blog.id);
    }
  }

  /// Point the list highlight at the selected blog once it is listed
  fn sync_selection(&mut self) {
    let Some(id) = self.browser.selected_id() else {
      return;
    };
    if let Some(idx) = self.browser.filtered_blogs().iter().position(|b| b.id == id) {
      self.list_state.select(Some(idx));
    }
  }

  // Accessors for UI rendering
  pub fn browser(&self) -> &BlogBrowser {
    &self.browser
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn search(&self) -> &SearchInput {
    &self.search
  }

  pub fn form(&self) -> &BlogFormInput {
    &self.form
  }

  pub fn list_state_mut(&mut self) -> &mut ListState {
    &mut self.list_state
  }

  pub fn detail_scroll(&self) -> u16 {
    self.detail_scroll
  }

  pub fn status_message(&self) -> Option<&str> {
    self.status.as_deref()
  }

  pub fn store_url(&self) -> &str {
    &self.config.store.url
  }

  pub fn title(&self) -> &str {
    self.config.title.as_deref().unwrap_or("blogdesk")
  }
}
