//! Category display formatting

use tabled::Tabled;

use super::render;
use crate::models::Category;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Icon")]
    icon: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'hearth init' to create the default categories."
            .to_string();
    }

    render(
        categories
            .iter()
            .map(|c| CategoryRow {
                name: c.name.clone(),
                color: c.color.clone(),
                icon: c.icon.clone(),
                status: if c.archived { "archived" } else { "active" },
                id: c.id.to_string(),
            })
            .collect(),
    )
}

pub fn format_category_details(category: &Category) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:       {}\n", category.id.key()));
    output.push_str(&format!("  Color:    {}\n", category.color));
    output.push_str(&format!("  Icon:     {}\n", category.icon));
    output.push_str(&format!(
        "  Status:   {}\n",
        if category.archived { "archived" } else { "active" }
    ));
    output.push_str(&format!(
        "  Created:  {}\n",
        category.created_at.format("%Y-%m-%d %H:%M")
    ));
    output
}
