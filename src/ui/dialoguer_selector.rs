//! dialoguer menus and prompts

use crate::types::MenuItem;
use dialoguer::{Input, Select, theme::ColorfulTheme};

pub struct DialoguerSelector {
    theme: ColorfulTheme,
}

impl DialoguerSelector {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Pick one item. None on Esc, `q`, or an empty menu.
    pub fn select<T: Clone>(&self, items: &[MenuItem<T>], prompt: &str) -> Option<T> {
        if items.is_empty() {
            return None;
        }

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
            .ok()
            .flatten()?;

        items.get(selection).map(|item| item.value.clone())
    }

    /// Read a line of text, pre-filled with `initial`
    pub fn input(&self, prompt: &str, initial: &str) -> dialoguer::Result<String> {
        Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
    }
}

impl Default for DialoguerSelector {
    fn default() -> Self {
        Self::new()
    }
}
