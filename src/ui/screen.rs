use ratatui::Frame;

use crate::{ui::history::render_history, App, AppScreen};

/// A UI Screen boundary: responsible for rendering one view of the app
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Typing screen, prompt plus live numbers
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Results screen, chart and summary of the finished session
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_history(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(screen: AppScreen) -> Box<dyn Screen> {
    match screen {
        AppScreen::Typing => Box::new(TypingScreen),
        AppScreen::Results => Box::new(ResultsScreen),
        AppScreen::History => Box::new(HistoryScreen),
    }
}
