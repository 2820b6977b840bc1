//! About page content.
//!
//! The store holds a single about document. Every field has a default so a
//! fresh deployment renders a complete page before an admin edits anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AboutId;

/// One card in the "our values" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutValue {
    pub title: String,
    pub description: String,
}

impl AboutValue {
    fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
        }
    }
}

/// The editable content of the about page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub story_title: String,
    pub story_paragraphs: Vec<String>,
    pub values_title: String,
    pub values: Vec<AboutValue>,
    pub contact_title: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
}

fn default_story_paragraphs() -> Vec<String> {
    [
        "Anar Shop бол загварын сонирхолтой хүмүүсийн бүтээл юм. Бид чанартай, орчин үеийн \
         хувцас, хэрэглэлүүдийг Монголын хэрэглэгчдэд хүргэх зорилготой.",
        "Манай бүтээгдэхүүнүүд нь хамгийн сайн чанартай материал, анхааралтай хийгдсэн \
         дизайн, байгаль орчинд ээлтэй үйлдвэрлэл зэргээр онцлогтой.",
        "Бид зөвхөн хувцас борлуулахгүй, харин таны амьдралын хэв маягийг илэрхийлэх арга \
         замыг санал болгодог.",
    ]
    .into_iter()
    .map(ToOwned::to_owned)
    .collect()
}

fn default_values() -> Vec<AboutValue> {
    vec![
        AboutValue::new(
            "Чанар",
            "Бид зөвхөн хамгийн сайн чанартай бүтээгдэхүүн санал болгодог",
        ),
        AboutValue::new("Хэрэглэгч", "Таны сэтгэл ханамж бидний тэргүүн зорилго"),
        AboutValue::new(
            "Байгаль орчин",
            "Байгаль орчинд ээлтэй үйлдвэрлэл, бүтээгдэхүүн",
        ),
    ]
}

impl Default for AboutContent {
    fn default() -> Self {
        Self {
            hero_title: "Бидний тухай".to_owned(),
            hero_subtitle: "Монголд бүтээгдсэн. Дэлхий даяар өмсөгддөг.".to_owned(),
            story_title: "Манай түүх".to_owned(),
            story_paragraphs: default_story_paragraphs(),
            values_title: "Манай үнэт зүйлс".to_owned(),
            values: default_values(),
            contact_title: "Холбоо барих".to_owned(),
            contact_email: "info@anarshop.mn".to_owned(),
            contact_phone: "+976 1234 5678".to_owned(),
            contact_address: "Улаанбаатар хот, Сүхбаатар дүүрэг".to_owned(),
        }
    }
}

fn fill_text(
    field: &mut String,
    default: String,
    name: &'static str,
    filled: &mut Vec<&'static str>,
) {
    if field.trim().is_empty() {
        *field = default;
        filled.push(name);
    }
}

fn fill_list<T>(
    field: &mut Vec<T>,
    default: Vec<T>,
    name: &'static str,
    filled: &mut Vec<&'static str>,
) {
    if field.is_empty() {
        *field = default;
        filled.push(name);
    }
}

impl AboutContent {
    /// Replace blank fields and empty lists with their defaults.
    ///
    /// Returns the camelCase names of the fields that were filled, empty when
    /// the content was already complete.
    pub fn fill_missing(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut filled = Vec::new();

        fill_text(&mut self.hero_title, defaults.hero_title, "heroTitle", &mut filled);
        fill_text(&mut self.hero_subtitle, defaults.hero_subtitle, "heroSubtitle", &mut filled);
        fill_text(&mut self.story_title, defaults.story_title, "storyTitle", &mut filled);
        fill_list(
            &mut self.story_paragraphs,
            defaults.story_paragraphs,
            "storyParagraphs",
            &mut filled,
        );
        fill_text(&mut self.values_title, defaults.values_title, "valuesTitle", &mut filled);
        fill_list(&mut self.values, defaults.values, "values", &mut filled);
        fill_text(&mut self.contact_title, defaults.contact_title, "contactTitle", &mut filled);
        fill_text(&mut self.contact_email, defaults.contact_email, "contactEmail", &mut filled);
        fill_text(&mut self.contact_phone, defaults.contact_phone, "contactPhone", &mut filled);
        fill_text(
            &mut self.contact_address,
            defaults.contact_address,
            "contactAddress",
            &mut filled,
        );

        filled
    }
}

/// The stored about document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(rename = "_id")]
    pub id: AboutId,
    #[serde(flatten)]
    pub content: AboutContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /api/about`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAboutRequest {
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub story_title: Option<String>,
    pub story_paragraphs: Option<Vec<String>>,
    pub values_title: Option<String>,
    pub values: Option<Vec<AboutValue>>,
    pub contact_title: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_address: Option<String>,
}

impl UpdateAboutRequest {
    /// Overwrite the fields present in this request.
    pub fn apply_to(self, content: &mut AboutContent) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut content.hero_title, self.hero_title);
        set(&mut content.hero_subtitle, self.hero_subtitle);
        set(&mut content.story_title, self.story_title);
        set(&mut content.story_paragraphs, self.story_paragraphs);
        set(&mut content.values_title, self.values_title);
        set(&mut content.values, self.values);
        set(&mut content.contact_title, self.contact_title);
        set(&mut content.contact_email, self.contact_email);
        set(&mut content.contact_phone, self.contact_phone);
        set(&mut content.contact_address, self.contact_address);
    }
}
