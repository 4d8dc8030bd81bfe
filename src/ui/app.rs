use crate::model::{Element, Model, Selection};
use crate::qto::QtoEngine;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusPanel {
    Models,
    Elements,
}

pub struct App {
    pub engine: QtoEngine,
    pub model_keys: Vec<String>,
    pub selection: Selection,
    pub focus_panel: FocusPanel,
    pub selected_model: usize,
    pub selected_element: usize,
    pub qto_visible: bool,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(engine: QtoEngine) -> Self {
        let model_keys = engine.models().map(|m| m.key.clone()).collect();
        Self {
            engine,
            model_keys,
            selection: Selection::new(),
            focus_panel: FocusPanel::Elements,
            selected_model: 0,
            selected_element: 0,
            qto_visible: true,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        self.engine.dispose();
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        super::dashboard::draw_dashboard(frame, self);
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
            KeyCode::Left | KeyCode::Char('h') => self.focus_panel = FocusPanel::Models,
            KeyCode::Right | KeyCode::Char('l') => self.focus_panel = FocusPanel::Elements,
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current_element(),
            KeyCode::Char('a') => self.select_all_in_model(),
            KeyCode::Char('c') => self.clear_selection(),
            KeyCode::Char('s') => self.cycle_strategy(),
            KeyCode::Char('t') => self.qto_visible = !self.qto_visible,
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.focus_panel {
            FocusPanel::Models => {
                if self.selected_model > 0 {
                    self.selected_model -= 1;
                    self.selected_element = 0;
                }
            }
            FocusPanel::Elements => {
                self.selected_element = self.selected_element.saturating_sub(1);
            }
        }
    }

    fn navigate_down(&mut self) {
        match self.focus_panel {
            FocusPanel::Models => {
                if self.selected_model < self.model_keys.len().saturating_sub(1) {
                    self.selected_model += 1;
                    self.selected_element = 0;
                }
            }
            FocusPanel::Elements => {
                if self.selected_element < self.current_elements().len().saturating_sub(1) {
                    self.selected_element += 1;
                }
            }
        }
    }

    fn toggle_current_element(&mut self) {
        let Some(key) = self.model_keys.get(self.selected_model).cloned() else {
            return;
        };
        let Some(id) = self.current_elements().get(self.selected_element).map(|e| e.id) else {
            return;
        };
        self.selection.toggle(&key, id);
        self.refresh();
    }

    fn select_all_in_model(&mut self) {
        let Some(model) = self.current_model() else {
            return;
        };
        let key = model.key.clone();
        let ids: Vec<u64> = model.element_ids().collect();
        self.selection.extend(&key, ids);
        self.refresh();
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.refresh();
    }

    fn cycle_strategy(&mut self) {
        self.engine.set_strategy(self.engine.strategy().next());
        self.refresh();
    }

    /// Pushes the current selection to the engine as a highlight or clear event.
    fn refresh(&mut self) {
        if self.selection.is_empty() {
            self.engine.on_clear();
        } else {
            self.engine.on_highlight(&self.selection);
        }
    }

    #[must_use]
    pub fn current_model(&self) -> Option<&Model> {
        self.model_keys
            .get(self.selected_model)
            .and_then(|key| self.engine.model(key))
    }

    #[must_use]
    pub fn current_elements(&self) -> &[Element] {
        self.current_model()
            .map(|m| m.elements.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_selected(&self, model: &str, id: u64) -> bool {
        self.selection.contains(model, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::wall_model;
    use crate::qto::Strategy;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        let mut model = wall_model("a");
        model.elements = vec![Element {
            id: 1,
            global_id: String::new(),
            name: "Wall".to_string(),
            entity_type: "IFCWALL".to_string(),
            storey: None,
        }];
        let mut engine = QtoEngine::new(Strategy::Index);
        engine.add_model(model);
        App::new(engine)
    }

    #[test]
    fn toggling_element_updates_takeoff() {
        let mut app = app();
        app.handle_key(KeyCode::Char(' '));
        assert!(app.is_selected("a", 1));
        assert_eq!(
            app.engine.result().get("Qto_WallBaseQuantities", "area"),
            Some(20.0)
        );

        app.handle_key(KeyCode::Char(' '));
        assert!(app.engine.result().is_empty());
    }

    #[test]
    fn clear_resets_takeoff() {
        let mut app = app();
        app.handle_key(KeyCode::Char('a'));
        assert!(!app.engine.result().is_empty());
        app.handle_key(KeyCode::Char('c'));
        assert!(app.selection.is_empty());
        assert!(app.engine.result().is_empty());
    }

    #[test]
    fn strategy_switch_keeps_result() {
        let mut app = app();
        app.handle_key(KeyCode::Char('a'));
        let before = app.engine.result().clone();
        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.engine.strategy(), Strategy::Both);
        assert_eq!(app.engine.result(), &before);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut app = app();
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected_element, 0);
        app.handle_key(KeyCode::Left);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected_model, 0);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
