//! Grid configuration.
//!
//! A [`GridConfig`] describes the dimensions and metrics of a uniform grid
//! and can be read from TOML. Every key is optional:
//!
//! ```toml
//! rows = 1000
//! columns = 26
//! row_height = 20
//! column_width = 80
//!
//! [font]
//! char_width = 7
//! line_height = 15
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::space::UniformGrid;
use crate::view::GuiContext;

/// Font metrics used to measure and draw views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub char_width: i32,
    pub line_height: i32,
}

impl Default for FontConfig {
    fn default() -> Self {
        let ctx = GuiContext::default();
        Self {
            char_width: ctx.char_width,
            line_height: ctx.line_height,
        }
    }
}

/// Dimensions and metrics of a uniform grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub columns: u32,
    pub row_height: i32,
    pub column_width: i32,
    pub font: FontConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            columns: 10,
            row_height: 20,
            column_width: 80,
            font: FontConfig::default(),
        }
    }
}

impl GridConfig {
    /// Parse and validate a configuration.
    pub fn from_toml_str(source: &str) -> GridResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every size is positive and the grid fits in `i32`
    /// coordinates.
    pub fn validate(&self) -> GridResult<()> {
        let sizes = [
            ("row_height", self.row_height),
            ("column_width", self.column_width),
            ("font.char_width", self.font.char_width),
            ("font.line_height", self.font.line_height),
        ];
        if let Some((name, value)) = sizes.iter().find(|(_, value)| *value <= 0) {
            return Err(GridError::InvalidConfig(format!(
                "{name} must be positive, got {value}"
            )));
        }

        let extents = [
            ("rows", self.rows, self.row_height),
            ("columns", self.columns, self.column_width),
        ];
        for (name, count, line_size) in extents {
            let extent = i64::from(count) * i64::from(line_size);
            if extent > i64::from(i32::MAX) {
                return Err(GridError::InvalidConfig(format!(
                    "{name} span {extent} pixels, more than {}",
                    i32::MAX
                )));
            }
        }
        Ok(())
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_row_height(mut self, row_height: i32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_column_width(mut self, column_width: i32) -> Self {
        self.column_width = column_width;
        self
    }

    pub fn with_font(mut self, char_width: i32, line_height: i32) -> Self {
        self.font = FontConfig {
            char_width,
            line_height,
        };
        self
    }

    /// The grid geometry described by this configuration.
    pub fn grid(&self) -> UniformGrid {
        UniformGrid::new(self.rows, self.columns, self.row_height, self.column_width)
    }

    /// The font metrics described by this configuration.
    pub fn gui_context(&self) -> GuiContext {
        GuiContext {
            char_width: self.font.char_width,
            line_height: self.font.line_height,
        }
    }
}
