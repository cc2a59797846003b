//! Built-in furniture catalog: 15 templates across four room categories.

use std::sync::OnceLock;

use crate::model::{Category, FurnitureTemplate};
use crate::types::Size;

const ENTRIES: &[(&str, &str, Category, &str, f64, f64)] = &[
    ("bed", "Bed", Category::Bedroom, "#b39ddb", 2.0, 3.0),
    ("dresser", "Dresser", Category::Bedroom, "#ffcc80", 2.0, 1.0),
    ("nightstand", "Nightstand", Category::Bedroom, "#ffe082", 1.0, 1.0),
    ("desk", "Desk", Category::Bedroom, "#80cbc4", 2.0, 1.0),
    ("sofa", "Sofa", Category::Living, "#f48fb1", 3.0, 1.0),
    ("tv", "TV", Category::Living, "#90caf9", 2.0, 1.0),
    ("coffee_table", "Coffee Table", Category::Living, "#bcaaa4", 2.0, 1.0),
    ("bookshelf", "Bookshelf", Category::Living, "#a5d6a7", 1.0, 2.0),
    ("dining_table", "Dining Table", Category::Kitchen, "#fff59d", 3.0, 2.0),
    ("fridge", "Fridge", Category::Kitchen, "#b0bec5", 1.0, 1.0),
    ("oven", "Oven", Category::Kitchen, "#ffab91", 1.0, 1.0),
    ("sink", "Sink", Category::Kitchen, "#b2dfdb", 1.0, 1.0),
    ("toilet", "Toilet", Category::Bathroom, "#e1bee7", 1.0, 1.0),
    ("shower", "Shower", Category::Bathroom, "#b3e5fc", 1.0, 2.0),
    ("cabinet", "Cabinet", Category::Bathroom, "#ffe0b2", 1.0, 1.0),
];

static CATALOG: OnceLock<Vec<FurnitureTemplate>> = OnceLock::new();

/// All built-in templates, in display order.
pub fn default_catalog() -> &'static [FurnitureTemplate] {
    CATALOG.get_or_init(|| {
        ENTRIES
            .iter()
            .filter_map(|&(id, label, category, color, w, h)| {
                FurnitureTemplate::new(id, label, category, color, Size::new(w, h)).ok()
            })
            .collect()
    })
}

/// Looks up a template by id.
pub fn find_template(id: &str) -> Option<&'static FurnitureTemplate> {
    default_catalog().iter().find(|tpl| tpl.id == id)
}

/// Templates belonging to one category.
pub fn templates_in(category: Category) -> impl Iterator<Item = &'static FurnitureTemplate> {
    default_catalog()
        .iter()
        .filter(move |tpl| tpl.category == category)
}
