use super::{RenderingPreference, Widget};
use crate::error::Result;
use crate::stack::{token, CfnResource};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Width of the dashboard grid
pub const GRID_WIDTH: u32 = 24;

/// A CloudWatch dashboard resource.
///
/// Widgets are added row by row; a row wraps onto the next line when it runs
/// out of grid width. The body is laid out and rendered at synthesis time.
#[derive(Debug)]
pub struct Dashboard {
    name: String,
    start: Option<String>,
    preference: RenderingPreference,
    rows: Mutex<Vec<Vec<Widget>>>,
}

impl Dashboard {
    pub fn new(name: impl Into<String>, start: Option<String>, preference: RenderingPreference) -> Self {
        Self {
            name: name.into(),
            start,
            preference,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rendering_preference(&self) -> RenderingPreference {
        self.preference
    }

    /// Appends the widgets as a new row; empty rows are ignored
    pub fn add_widgets(&self, widgets: Vec<Widget>) {
        if !widgets.is_empty() {
            self.rows.lock().push(widgets);
        }
    }

    pub fn widget_count(&self) -> usize {
        self.rows.lock().iter().map(Vec::len).sum()
    }

    fn layout(&self) -> Vec<Value> {
        let rows = self.rows.lock();
        let mut rendered = Vec::new();
        let mut y = 0;

        for row in rows.iter() {
            let mut x = 0;
            let mut row_height = 0;
            for widget in row {
                let width = widget.width().min(GRID_WIDTH);
                if x + width > GRID_WIDTH {
                    y += row_height;
                    x = 0;
                    row_height = 0;
                }
                rendered.push(widget.render(self.preference, x, y));
                x += width;
                row_height = row_height.max(widget.height());
            }
            y += row_height;
        }
        rendered
    }

    /// Dashboard body before stringification
    pub fn body(&self) -> Value {
        let mut body = json!({ "periodOverride": "inherit", "widgets": self.layout() });
        if let Some(start) = &self.start {
            body["start"] = json!(start);
        }
        body
    }
}

impl CfnResource for Dashboard {
    fn resource_type(&self) -> &str {
        "AWS::CloudWatch::Dashboard"
    }

    fn properties(&self) -> Result<Value> {
        Ok(json!({
            "DashboardBody": token::stringify(&self.body())?,
            "DashboardName": self.name,
        }))
    }
}
