//! Layout Container
//!
//! Groups consecutive fields that share a column family into one
//! `row-separator` row. Three interchangeable variants honour the same
//! open/close contract:
//!
//! - [`CssReadyContainer`]: the `gf_left_half` … `gf_fourth_quarter` classes
//! - [`GridContainer`]: the `gfield--width-*` classes on a 12-span grid
//! - [`VoidContainer`]: no wrapping at all

use formpdf_model::{Field, FieldKind, Form};

use crate::html;

const ROW_OPEN: &str = "<div class=\"row-separator\">\n";
const ROW_CLOSE: &str = "</div>\n";

/// Row wrapper state machine used by the document assembler
pub trait LayoutContainer {
    /// Prepare the row for a field that is about to be written
    fn generate(&mut self, field: &Field, out: &mut String);

    /// Emit an empty column in place of a skipped field
    ///
    /// The placeholder takes the same row transition a rendered field would,
    /// so later fields keep their horizontal position.
    fn placeholder(&mut self, field: &Field, out: &mut String);

    /// Close any open row
    fn close(&mut self, out: &mut String);

    /// Whether a row is currently open
    fn is_open(&self) -> bool;
}

/// Which container variant to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    CssReady,
    Grid,
    Void,
}

impl LayoutKind {
    /// Pick the variant for a form
    ///
    /// Forms using any `gfield--width-*` class get the grid variant.
    pub fn detect(form: &Form, column_layout: bool) -> Self {
        if !column_layout {
            return LayoutKind::Void;
        }
        let uses_grid = form
            .fields
            .iter()
            .any(|f| f.classes().any(|c| grid_span(c).is_some()));
        if uses_grid {
            LayoutKind::Grid
        } else {
            LayoutKind::CssReady
        }
    }

    /// Create a fresh container of this kind
    pub fn container(self) -> Box<dyn LayoutContainer> {
        match self {
            LayoutKind::CssReady => Box::new(CssReadyContainer::new()),
            LayoutKind::Grid => Box::new(GridContainer::new()),
            LayoutKind::Void => Box::new(VoidContainer),
        }
    }
}

/// Kinds that always span the full width and end any open row
fn breaks_row(kind: &FieldKind) -> bool {
    matches!(kind, FieldKind::Section | FieldKind::Page)
}

/// Column family of a CSS-ready class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Half,
    Third,
    Quarter,
}

/// A CSS-ready column: family plus left-to-right position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Column {
    family: Family,
    position: usize,
}

fn css_ready_column(class: &str) -> Option<Column> {
    let (family, position) = match class {
        "gf_left_half" => (Family::Half, 0),
        "gf_right_half" => (Family::Half, 1),
        "gf_left_third" => (Family::Third, 0),
        "gf_middle_third" => (Family::Third, 1),
        "gf_right_third" => (Family::Third, 2),
        "gf_first_quarter" => (Family::Quarter, 0),
        "gf_second_quarter" => (Family::Quarter, 1),
        "gf_third_quarter" => (Family::Quarter, 2),
        "gf_fourth_quarter" => (Family::Quarter, 3),
        _ => return None,
    };
    Some(Column { family, position })
}

/// Find the first CSS-ready class on a field
fn field_column(field: &Field) -> Option<(Column, &str)> {
    field
        .classes()
        .find_map(|c| css_ready_column(c).map(|col| (col, c)))
}

fn write_placeholder(class: &str, out: &mut String) {
    out.push_str(&format!("<div class=\"{}\"></div>\n", html::escape(class)));
}

/// Row state of the CSS-ready container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    Closed,
    Open(Column),
}

/// Container for the CSS-ready column classes
#[derive(Debug)]
pub struct CssReadyContainer {
    state: RowState,
}

impl CssReadyContainer {
    pub fn new() -> Self {
        Self {
            state: RowState::Closed,
        }
    }

    fn enter(&mut self, column: Column, out: &mut String) {
        if let RowState::Open(open) = self.state {
            // Same family, further right: stay in the row
            if open.family == column.family && column.position > open.position {
                self.state = RowState::Open(column);
                return;
            }
            self.close(out);
        }
        out.push_str(ROW_OPEN);
        self.state = RowState::Open(column);
    }
}

impl Default for CssReadyContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutContainer for CssReadyContainer {
    fn generate(&mut self, field: &Field, out: &mut String) {
        if breaks_row(&field.kind) {
            self.close(out);
            return;
        }
        match field_column(field) {
            Some((column, _)) => self.enter(column, out),
            None => self.close(out),
        }
    }

    fn placeholder(&mut self, field: &Field, out: &mut String) {
        if breaks_row(&field.kind) {
            return;
        }
        if let Some((column, class)) = field_column(field) {
            self.enter(column, out);
            write_placeholder(class, out);
        }
    }

    fn close(&mut self, out: &mut String) {
        if self.state != RowState::Closed {
            out.push_str(ROW_CLOSE);
            self.state = RowState::Closed;
        }
    }

    fn is_open(&self) -> bool {
        self.state != RowState::Closed
    }
}

/// Number of grid columns in one row
const GRID_COLUMNS: u8 = 12;

fn grid_span(class: &str) -> Option<u8> {
    let span = match class.strip_prefix("gfield--width-")? {
        "full" => 12,
        "eleven-twelfths" => 11,
        "five-sixths" => 10,
        "three-quarter" => 9,
        "two-thirds" => 8,
        "seven-twelfths" => 7,
        "half" => 6,
        "five-twelfths" => 5,
        "third" => 4,
        "quarter" => 3,
        "one-sixth" => 2,
        "one-twelfth" => 1,
        _ => return None,
    };
    Some(span)
}

fn field_span(field: &Field) -> Option<(u8, &str)> {
    field
        .classes()
        .find_map(|c| grid_span(c).map(|span| (span, c)))
}

/// Container for the 12-span grid classes
#[derive(Debug, Default)]
pub struct GridContainer {
    /// Spans used by the open row, `None` when closed
    used: Option<u8>,
}

impl GridContainer {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, span: u8, out: &mut String) {
        if let Some(used) = self.used {
            if used + span <= GRID_COLUMNS {
                self.used = Some(used + span);
                return;
            }
            self.close(out);
        }
        out.push_str(ROW_OPEN);
        self.used = Some(span);
    }
}

impl LayoutContainer for GridContainer {
    fn generate(&mut self, field: &Field, out: &mut String) {
        if breaks_row(&field.kind) {
            self.close(out);
            return;
        }
        match field_span(field) {
            Some((span, _)) => self.enter(span, out),
            None => self.close(out),
        }
    }

    fn placeholder(&mut self, field: &Field, out: &mut String) {
        if breaks_row(&field.kind) {
            return;
        }
        if let Some((span, class)) = field_span(field) {
            self.enter(span, out);
            write_placeholder(class, out);
        }
    }

    fn close(&mut self, out: &mut String) {
        if self.used.take().is_some() {
            out.push_str(ROW_CLOSE);
        }
    }

    fn is_open(&self) -> bool {
        self.used.is_some()
    }
}

/// Container that never wraps fields
#[derive(Debug, Default)]
pub struct VoidContainer;

impl LayoutContainer for VoidContainer {
    fn generate(&mut self, _field: &Field, _out: &mut String) {}

    fn placeholder(&mut self, _field: &Field, _out: &mut String) {}

    fn close(&mut self, _out: &mut String) {}

    fn is_open(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: u32, class: &str) -> Field {
        Field::new(id, FieldKind::Text, format!("Field {}", id)).with_class(class)
    }

    #[test]
    fn test_same_family_shares_a_row() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();

        container.generate(&field(1, "gf_left_half"), &mut out);
        assert!(container.is_open());
        container.generate(&field(2, "gf_right_half"), &mut out);
        container.close(&mut out);

        assert_eq!(out.matches(ROW_OPEN).count(), 1);
        assert_eq!(out.matches(ROW_CLOSE).count(), 1);
        assert!(!container.is_open());
    }

    #[test]
    fn test_family_change_starts_new_row() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();

        container.generate(&field(1, "gf_left_half"), &mut out);
        container.generate(&field(2, "gf_middle_third"), &mut out);
        container.close(&mut out);

        assert_eq!(out, format!("{ROW_OPEN}{ROW_CLOSE}{ROW_OPEN}{ROW_CLOSE}"));
    }

    #[test]
    fn test_repeated_left_column_starts_new_row() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();

        container.generate(&field(1, "gf_left_third"), &mut out);
        container.generate(&field(2, "gf_left_third"), &mut out);
        assert_eq!(out.matches(ROW_OPEN).count(), 2);
    }

    #[test]
    fn test_unclassed_field_closes_row() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();

        container.generate(&field(1, "gf_left_half"), &mut out);
        container.generate(&field(2, ""), &mut out);
        assert!(!container.is_open());
        assert_eq!(out, format!("{ROW_OPEN}{ROW_CLOSE}"));
    }

    #[test]
    fn test_section_breaks_row() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();

        container.generate(&field(1, "gf_left_half"), &mut out);
        let section = Field::new(2, FieldKind::Section, "Details").with_class("gf_right_half");
        container.generate(&section, &mut out);
        assert!(!container.is_open());
    }

    #[test]
    fn test_placeholder_keeps_alignment() {
        let mut with_skip = CssReadyContainer::new();
        let mut skipped = String::new();
        with_skip.placeholder(&field(1, "gf_left_half"), &mut skipped);
        with_skip.generate(&field(2, "gf_right_half"), &mut skipped);
        with_skip.close(&mut skipped);

        assert_eq!(
            skipped,
            format!("{ROW_OPEN}<div class=\"gf_left_half\"></div>\n{ROW_CLOSE}")
        );
    }

    #[test]
    fn test_placeholder_without_column_class_emits_nothing() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();
        container.generate(&field(1, "gf_left_half"), &mut out);
        let before = out.clone();

        container.placeholder(&field(2, "exclude"), &mut out);
        assert_eq!(out, before);
        assert!(container.is_open());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut container = CssReadyContainer::new();
        let mut out = String::new();
        container.close(&mut out);
        container.close(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_grid_fills_twelve_columns() {
        let mut container = GridContainer::new();
        let mut out = String::new();

        container.generate(&field(1, "gfield--width-half"), &mut out);
        container.generate(&field(2, "gfield--width-quarter"), &mut out);
        container.generate(&field(3, "gfield--width-quarter"), &mut out);
        assert_eq!(out.matches(ROW_OPEN).count(), 1);

        container.generate(&field(4, "gfield--width-two-thirds"), &mut out);
        assert_eq!(out.matches(ROW_OPEN).count(), 2);
        assert_eq!(out.matches(ROW_CLOSE).count(), 1);

        container.close(&mut out);
        assert_eq!(out.matches(ROW_CLOSE).count(), 2);
    }

    #[test]
    fn test_grid_placeholder_consumes_span() {
        let mut container = GridContainer::new();
        let mut out = String::new();

        container.placeholder(&field(1, "gfield--width-half"), &mut out);
        container.generate(&field(2, "gfield--width-half"), &mut out);
        container.close(&mut out);

        assert_eq!(out.matches(ROW_OPEN).count(), 1);
        assert!(out.contains("<div class=\"gfield--width-half\"></div>"));
    }

    #[test]
    fn test_void_never_wraps() {
        let mut container = VoidContainer;
        let mut out = String::new();
        container.generate(&field(1, "gf_left_half"), &mut out);
        container.placeholder(&field(2, "gf_right_half"), &mut out);
        container.close(&mut out);
        assert!(out.is_empty());
        assert!(!container.is_open());
    }

    #[test]
    fn test_detect_layout_kind() {
        let mut form = Form::new(1, "Layout");
        form.push_field(field(1, "gf_left_half"));
        assert_eq!(LayoutKind::detect(&form, true), LayoutKind::CssReady);
        assert_eq!(LayoutKind::detect(&form, false), LayoutKind::Void);

        form.push_field(field(2, "gfield--width-third"));
        assert_eq!(LayoutKind::detect(&form, true), LayoutKind::Grid);
    }
}
