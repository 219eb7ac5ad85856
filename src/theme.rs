use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    /// Word colors, assigned round-robin by color index.
    pub palette: Vec<String>,
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            palette: vec![
                "#1C2430".to_string(),
                "#2563EB".to_string(),
                "#0D9488".to_string(),
                "#D97706".to_string(),
                "#DB2777".to_string(),
                "#7C3AED".to_string(),
            ],
        }
    }

    pub fn paper() -> Self {
        Self {
            font_family: "Georgia, \"Times New Roman\", serif".to_string(),
            background: "#FAF6EE".to_string(),
            palette: vec![
                "#3B3024".to_string(),
                "#7A5C3E".to_string(),
                "#A63D2F".to_string(),
                "#51604A".to_string(),
                "#2F4858".to_string(),
            ],
        }
    }

    pub fn color(&self, index: u16) -> &str {
        let len = self.palette.len().max(1);
        self.palette
            .get(index as usize % len)
            .map(String::as_str)
            .unwrap_or("#000000")
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::modern()
    }
}
