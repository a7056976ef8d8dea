//! One-shot enrichment of the bundled demo dataset.
//!
//! Walks `countries -> cities -> things_to_do / cafes` and fills in fields the
//! screens expect but the raw dataset may lack. Existing values are never
//! overwritten or removed, so running the pass twice is a no-op.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_BEST_TIME: &str = "Anytime";
pub const DEFAULT_OPTION_DURATION: &str = "1 hr";
pub const DEFAULT_EXPERIENCE_DURATION: &str = "2 hrs";
pub const DEFAULT_CAFE_VIBE: &str = "Relaxed, welcoming";
pub const DEFAULT_COST_RANGE: &str = "mid";
pub const DEFAULT_PRICE_LEVEL: &str = "mid";
pub const DEFAULT_OPEN_HOURS: &str = "08:00-20:00";
pub const ALL_YEAR: &str = "All year";

/// Seed for generated ratings, review counts and menu picks, so two runs over
/// the same raw dataset produce the same file.
pub const DEFAULT_SEED: u64 = 0x7665_7273_6f;

const CAFE_FEATURES: [&str; 3] = ["wifi", "outdoor", "coffee"];
const MENU_HIGHLIGHTS: [&str; 3] = ["Specialty coffee", "Fresh pastries", "Healthy bowls"];
const SUBCOPY_MIN_CHARS: usize = 100;
const SUBCOPY_WORDS: usize = 14;
const NOTES_VIBE_CHARS: usize = 30;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected dataset shape at {path}: expected {expected}")]
    Shape { path: String, expected: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
}

impl Theme {
    /// `"food culture"` and `"food_culture"` both become
    /// `{ id: "food_culture", name: "Food Culture" }`.
    pub fn from_label(label: &str) -> Self {
        let id = label.trim().replace(' ', "_").to_lowercase();
        let name = label
            .trim()
            .replace('_', " ")
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
        Self { id, name }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CityEnrichment {
    pub description: Option<String>,
    pub image_keywords: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryEnrichment {
    pub description: Option<String>,
    pub best_time: Option<String>,
    pub cost_range: Option<String>,
    pub duration_hint: Option<String>,
    pub hero_image_keywords: Option<String>,
    pub themes: Option<Vec<Theme>>,
    pub cities: HashMap<String, CityEnrichment>,
}

/// Hand-written storytelling keyed by dataset ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Enrichments {
    pub countries: HashMap<String, CountryEnrichment>,
}

impl Enrichments {
    pub fn from_json(json: &str) -> Result<Self, EnrichError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichReport {
    pub countries: usize,
    pub cities: usize,
    pub experiences: usize,
    pub options: usize,
    pub cafes: usize,
}

/// `$`-style price marks to the range buckets the screens filter on.
pub fn cost_range_from_price(cost: Option<&str>) -> String {
    match cost {
        None | Some("") => DEFAULT_COST_RANGE.to_string(),
        Some("Free" | "$") => "low".to_string(),
        Some("$$") => "low-mid".to_string(),
        Some("$$$") => "mid-high".to_string(),
        Some("$$$$") => "high".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Price band derived from a `cost_range` bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub min: u32,
    pub max: u32,
    pub level: String,
}

impl CostEstimate {
    /// Unknown buckets are priced as `mid`.
    pub fn for_range(range: &str) -> Self {
        let (min, max, level) = match range {
            "low" => (5, 20, "low"),
            "low-mid" => (15, 40, "mid"),
            "mid-high" => (50, 100, "high"),
            "high" => (80, 150, "high"),
            _ => (30, 60, "mid"),
        };
        Self {
            min,
            max,
            level: level.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Hours,
    Minutes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
    pub unit: DurationUnit,
}

impl Default for DurationRange {
    fn default() -> Self {
        Self {
            min: 2,
            max: 3,
            unit: DurationUnit::Hours,
        }
    }
}

impl DurationRange {
    /// Finds the first `N[-M] <unit>` in free text such as `"2-3 hrs"` or
    /// `"about 45 min"`. Units: `hr`, `hrs`, `hour(s)`, `min`, `minute(s)`.
    pub fn parse(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        lower
            .char_indices()
            .filter(|(_, c)| c.is_ascii_digit())
            .find_map(|(i, _)| Self::parse_at(&lower[i..]))
    }

    fn parse_at(s: &str) -> Option<Self> {
        let (min, rest) = leading_number(s)?;
        let (max, rest) = match rest.strip_prefix('-').and_then(leading_number) {
            Some(found) => found,
            None => (min, rest),
        };
        let rest = rest.trim_start();
        let unit = if rest.starts_with("min") {
            DurationUnit::Minutes
        } else if rest.starts_with("hr") || rest.starts_with("hour") {
            DurationUnit::Hours
        } else {
            return None;
        };
        Some(Self { min, max, unit })
    }
}

fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}

/// 50 by default, 75 for experiences tagged `Popular`, 10 less when expensive.
pub fn crowd_score(tags: Option<&Value>, cost_level: Option<&str>) -> i64 {
    let popular = tags
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some("Popular")));
    let base = if popular { 75 } else { 50 };
    let adjust = if cost_level == Some("high") { -10 } else { 0 };
    (base + adjust).clamp(0, 100)
}

/// Short teaser for long descriptions: the first 14 words and an ellipsis.
pub fn sensory_subcopy(description: &str) -> String {
    if description.chars().count() > SUBCOPY_MIN_CHARS {
        let words: Vec<&str> = description.split(' ').collect();
        if words.len() > SUBCOPY_WORDS {
            return format!("{}...", words[..SUBCOPY_WORDS].join(" "));
        }
    }
    description.to_string()
}

/// `"% Arabica Kyoto"` -> `"_arabica_kyoto"`.
pub fn cafe_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_gap = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }
    slug
}

/// Leading clause of free-form cafe notes, up to the first em dash.
fn vibe_from_notes(notes: &str) -> String {
    notes
        .split('\u{2014}')
        .next()
        .unwrap_or_default()
        .chars()
        .take(NOTES_VIBE_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn enrich_dataset(
    dataset: &mut Value,
    enrichments: &Enrichments,
) -> Result<EnrichReport, EnrichError> {
    enrich_dataset_with(dataset, enrichments, &mut StdRng::seed_from_u64(DEFAULT_SEED))
}

/// Like [`enrich_dataset`], drawing generated values from `rng`.
pub fn enrich_dataset_with<R: Rng>(
    dataset: &mut Value,
    enrichments: &Enrichments,
    rng: &mut R,
) -> Result<EnrichReport, EnrichError> {
    let countries = dataset
        .get_mut("countries")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| EnrichError::Shape {
            path: "countries".to_string(),
            expected: "object",
        })?;

    let none = CountryEnrichment::default();
    let mut report = EnrichReport::default();
    for (country_id, country) in countries.iter_mut() {
        let country = country.as_object_mut().ok_or_else(|| EnrichError::Shape {
            path: format!("countries.{country_id}"),
            expected: "object",
        })?;
        let table = enrichments.countries.get(country_id).unwrap_or(&none);
        enrich_country(country_id, country, table, &mut report, rng)?;
        report.countries += 1;
    }

    info!(
        countries = report.countries,
        cities = report.cities,
        experiences = report.experiences,
        "dataset enriched"
    );
    Ok(report)
}

/// Reads, enriches and rewrites a dataset file as pretty JSON.
pub fn enrich_file(path: &Path, enrichments: &Enrichments) -> Result<EnrichReport, EnrichError> {
    let raw = fs::read_to_string(path)?;
    let mut dataset: Value = serde_json::from_str(&raw)?;
    let report = enrich_dataset(&mut dataset, enrichments)?;
    let mut out = serde_json::to_string_pretty(&dataset)?;
    out.push('\n');
    fs::write(path, out)?;
    debug!(path = %path.display(), "dataset written");
    Ok(report)
}

fn enrich_country<R: Rng>(
    country_id: &str,
    country: &mut Map<String, Value>,
    table: &CountryEnrichment,
    report: &mut EnrichReport,
    rng: &mut R,
) -> Result<(), EnrichError> {
    fill_opt(country, "description", table.description.as_deref());
    fill_opt(country, "best_time", table.best_time.as_deref());
    fill_opt(country, "cost_range", table.cost_range.as_deref());
    fill_opt(country, "duration_hint", table.duration_hint.as_deref());
    join_field(country, "hero_image_keywords");
    fill_opt(country, "hero_image_keywords", table.hero_image_keywords.as_deref());

    match country.get_mut("themes") {
        Some(Value::Array(themes)) => {
            for theme in themes.iter_mut() {
                if let Some(label) = theme.as_str().map(str::to_string) {
                    *theme = serde_json::to_value(Theme::from_label(&label))?;
                }
            }
        }
        _ => {
            if let Some(themes) = &table.themes {
                country.insert("themes".to_string(), serde_json::to_value(themes)?);
            }
        }
    }

    let best_months = country
        .get("seasonality")
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| json!([ALL_YEAR]));

    let Some(cities) = country.get_mut("cities") else {
        return Ok(());
    };
    let cities = cities.as_object_mut().ok_or_else(|| EnrichError::Shape {
        path: format!("countries.{country_id}.cities"),
        expected: "object",
    })?;

    let none = CityEnrichment::default();
    for (city_id, city) in cities.iter_mut() {
        let city = city.as_object_mut().ok_or_else(|| EnrichError::Shape {
            path: format!("countries.{country_id}.cities.{city_id}"),
            expected: "object",
        })?;
        let city_table = table.cities.get(city_id).unwrap_or(&none);
        enrich_city(city, city_table, &best_months, report, rng);
        report.cities += 1;
    }
    Ok(())
}

fn enrich_city<R: Rng>(
    city: &mut Map<String, Value>,
    table: &CityEnrichment,
    best_months: &Value,
    report: &mut EnrichReport,
    rng: &mut R,
) {
    fill_opt(city, "description", table.description.as_deref());
    join_keywords(city);
    fill_opt(city, "image_keywords", table.image_keywords.as_deref());

    for experience in objects_in(city, "things_to_do") {
        enrich_experience(experience, best_months, report, rng);
        report.experiences += 1;
    }
    for cafe in objects_in(city, "cafes") {
        enrich_cafe(cafe, rng);
        report.cafes += 1;
    }
}

fn enrich_experience<R: Rng>(
    experience: &mut Map<String, Value>,
    best_months: &Value,
    report: &mut EnrichReport,
    rng: &mut R,
) {
    if !has(experience, "experience_id") {
        if let Some(id) = experience.get("id").cloned() {
            experience.insert("experience_id".to_string(), id);
        }
    }

    let title = str_field(experience, "title").unwrap_or_default().to_string();
    fill(experience, "subtitle", &format!("Experience {title}"));
    fill(
        experience,
        "description",
        &format!("Discover the magic of {title}. An unforgettable experience awaits."),
    );

    if !has(experience, "cost_range") {
        let range = cost_range_from_price(str_field(experience, "cost"));
        experience.insert("cost_range".to_string(), Value::String(range));
    }
    if !has(experience, "cost_estimate") {
        let range = str_field(experience, "cost_range").unwrap_or(DEFAULT_COST_RANGE);
        let estimate = CostEstimate::for_range(range);
        experience.insert("cost_estimate".to_string(), json!(estimate));
    }
    if !has(experience, "duration_min_max") {
        let duration = str_field(experience, "duration").unwrap_or(DEFAULT_EXPERIENCE_DURATION);
        let range = DurationRange::parse(duration).unwrap_or_default();
        experience.insert("duration_min_max".to_string(), json!(range));
    }

    fill(experience, "best_time", DEFAULT_BEST_TIME);
    for list in ["tags", "nearby_cafes", "related_activities"] {
        fill_value(experience, list, json!([]));
    }
    if !has(experience, "activity_tags") {
        let tags = experience.get("tags").cloned().unwrap_or_else(|| json!([]));
        experience.insert("activity_tags".to_string(), tags);
    }
    fill_value(experience, "best_months", best_months.clone());

    if !has(experience, "crowd_score") {
        let level = experience
            .get("cost_estimate")
            .and_then(|e| e.get("level"))
            .and_then(Value::as_str);
        let score = crowd_score(experience.get("tags"), level);
        experience.insert("crowd_score".to_string(), json!(score));
    }
    if !has(experience, "rating") {
        let rating: f64 = 4.5 + rng.gen_range(0.0..0.4);
        experience.insert("rating".to_string(), json!((rating * 10.0).round() / 10.0));
    }
    if !has(experience, "reviews") {
        let crowded = experience
            .get("crowd_score")
            .and_then(Value::as_i64)
            .is_some_and(|score| score > 70);
        let base: u32 = if crowded { 500 } else { 200 };
        experience.insert("reviews".to_string(), json!(base + rng.gen_range(0..300)));
    }
    if !has(experience, "sensory_subcopy") {
        let subcopy = sensory_subcopy(str_field(experience, "description").unwrap_or_default());
        experience.insert("sensory_subcopy".to_string(), Value::String(subcopy));
    }
    join_keywords(experience);

    for option in objects_in(experience, "specific_options") {
        enrich_option(option);
        report.options += 1;
    }
}

fn enrich_cafe<R: Rng>(cafe: &mut Map<String, Value>, rng: &mut R) {
    if !has(cafe, "cafe_id") {
        if let Some(slug) = str_field(cafe, "name").map(cafe_slug) {
            cafe.insert("cafe_id".to_string(), Value::String(slug));
        }
    }
    fill(cafe, "price_level", DEFAULT_PRICE_LEVEL);
    fill(cafe, "open_hours", DEFAULT_OPEN_HOURS);
    fill_value(cafe, "features", json!(CAFE_FEATURES));
    if !has(cafe, "menu_highlights") {
        let pick = MENU_HIGHLIGHTS[rng.gen_range(0..MENU_HIGHLIGHTS.len())];
        cafe.insert("menu_highlights".to_string(), json!([pick]));
    }
    fill_value(cafe, "dietary_friendly", json!([]));

    if !has(cafe, "vibe") {
        if let Some(vibe) = str_field(cafe, "notes")
            .map(vibe_from_notes)
            .filter(|v| !v.is_empty())
        {
            cafe.insert("vibe".to_string(), Value::String(vibe));
        }
    }
    fill(cafe, "vibe", DEFAULT_CAFE_VIBE);
    if !has(cafe, "noise_level") {
        let quiet = str_field(cafe, "vibe").is_some_and(|v| v.contains("quiet"));
        let level = if quiet { "quiet" } else { "moderate" };
        cafe.insert("noise_level".to_string(), Value::String(level.to_string()));
    }
    join_keywords(cafe);
}

fn enrich_option(option: &mut Map<String, Value>) {
    let name = str_field(option, "name").map(str::to_string);
    if !has(option, "title") {
        if let Some(name) = &name {
            option.insert("title".to_string(), Value::String(name.clone()));
        }
    }

    let title = str_field(option, "title").unwrap_or_default().to_string();
    fill(option, "description", &format!("Experience {title}"));
    fill(option, "duration", DEFAULT_OPTION_DURATION);

    let location = str_field(option, "location").unwrap_or_default();
    let keywords = format!("{} {location}", name.as_deref().unwrap_or(&title))
        .trim()
        .to_lowercase();
    if !keywords.is_empty() {
        fill(option, "image_keywords", &keywords);
    }
}

fn objects_in<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a mut Map<String, Value>> {
    parent
        .get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|items| items.iter_mut())
        .filter_map(Value::as_object_mut)
}

fn join_keywords(obj: &mut Map<String, Value>) {
    join_field(obj, "image_keywords");
}

/// Keyword arrays become one space-separated string.
fn join_field(obj: &mut Map<String, Value>, key: &str) {
    if let Some(Value::Array(words)) = obj.get(key) {
        let joined = words
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        obj.insert(key.to_string(), Value::String(joined));
    }
}

/// Present and not an empty string / null.
fn has(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn fill(obj: &mut Map<String, Value>, key: &str, value: &str) {
    if !has(obj, key) {
        obj.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn fill_value(obj: &mut Map<String, Value>, key: &str, value: Value) {
    if !has(obj, key) {
        obj.insert(key.to_string(), value);
    }
}

fn fill_opt(obj: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        fill(obj, key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "countries": {
                "japan": {
                    "name": "Japan",
                    "themes": ["food culture", "heritage"],
                    "hero_image_keywords": ["mount", "fuji"],
                    "seasonality": ["Mar", "Apr", "Nov"],
                    "cities": {
                        "kyoto": {
                            "image_keywords": ["kyoto", "temple"],
                            "things_to_do": [{
                                "id": "fushimi",
                                "title": "Fushimi Inari",
                                "cost": "Free",
                                "duration": "2-3 hrs",
                                "tags": ["Popular", "Hiking"],
                                "image_keywords": ["torii", "gates"],
                                "specific_options": [
                                    {"name": "Dawn Hike", "location": "Inari"}
                                ]
                            }],
                            "cafes": [
                                {"name": "% Arabica", "image_keywords": ["latte"]},
                                {"name": "Weekenders", "notes": "quiet garden courtyard \u{2014} pour-over bar"}
                            ]
                        }
                    }
                }
            }
        })
    }

    fn table() -> Enrichments {
        Enrichments::from_json(
            r#"{"japan": {
                "description": "Where temples meet neon.",
                "cost_range": "mid-high",
                "cities": {"kyoto": {"description": "Ancient capital."}}
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn cost_marks_map_to_ranges() {
        assert_eq!(cost_range_from_price(None), "mid");
        assert_eq!(cost_range_from_price(Some("Free")), "low");
        assert_eq!(cost_range_from_price(Some("$$")), "low-mid");
        assert_eq!(cost_range_from_price(Some("$$$")), "mid-high");
        assert_eq!(cost_range_from_price(Some("$$$$")), "high");
        assert_eq!(cost_range_from_price(Some("varies")), "varies");
    }

    #[test]
    fn theme_labels_become_objects() {
        assert_eq!(
            Theme::from_label("food culture"),
            Theme { id: "food_culture".into(), name: "Food Culture".into() }
        );
        assert_eq!(Theme::from_label("onsen_escapes").name, "Onsen Escapes");
    }

    #[test]
    fn fills_every_level() {
        let mut data = sample();
        let report = enrich_dataset(&mut data, &table()).unwrap();
        assert_eq!(
            report,
            EnrichReport { countries: 1, cities: 1, experiences: 1, options: 1, cafes: 2 }
        );

        let japan = &data["countries"]["japan"];
        assert_eq!(japan["description"], "Where temples meet neon.");
        assert_eq!(japan["themes"][0]["id"], "food_culture");
        assert_eq!(japan["hero_image_keywords"], "mount fuji");

        let kyoto = &japan["cities"]["kyoto"];
        assert_eq!(kyoto["description"], "Ancient capital.");
        assert_eq!(kyoto["image_keywords"], "kyoto temple");

        let exp = &kyoto["things_to_do"][0];
        assert_eq!(exp["experience_id"], "fushimi");
        assert_eq!(exp["subtitle"], "Experience Fushimi Inari");
        assert_eq!(exp["cost_range"], "low");
        assert_eq!(exp["cost"], "Free", "source fields are kept");
        assert_eq!(exp["best_time"], "Anytime");
        assert_eq!(exp["tags"], json!([]));
        assert_eq!(exp["image_keywords"], "torii gates");
        assert_eq!(exp["cost_estimate"], json!({"min": 5, "max": 20, "level": "low"}));
        assert_eq!(exp["duration_min_max"], json!({"min": 2, "max": 3, "unit": "hours"}));
        assert_eq!(exp["crowd_score"], 75);
        assert_eq!(exp["best_months"], json!(["Mar", "Apr", "Nov"]));
        assert_eq!(exp["activity_tags"], json!(["Popular", "Hiking"]));
        let rating = exp["rating"].as_f64().unwrap();
        assert!((4.5..=4.9).contains(&rating));
        let reviews = exp["reviews"].as_u64().unwrap();
        assert!((500..800).contains(&reviews), "popular experiences start at 500");
        assert_eq!(exp["sensory_subcopy"], exp["description"]);

        let option = &exp["specific_options"][0];
        assert_eq!(option["title"], "Dawn Hike");
        assert_eq!(option["duration"], "1 hr");
        assert_eq!(option["image_keywords"], "dawn hike inari");

        let cafe = &kyoto["cafes"][0];
        assert_eq!(cafe["vibe"], "Relaxed, welcoming");
        assert_eq!(cafe["image_keywords"], "latte");
        assert_eq!(cafe["cafe_id"], "_arabica");
        assert_eq!(cafe["price_level"], "mid");
        assert_eq!(cafe["open_hours"], "08:00-20:00");
        assert_eq!(cafe["features"], json!(["wifi", "outdoor", "coffee"]));
        assert_eq!(cafe["dietary_friendly"], json!([]));
        assert_eq!(cafe["noise_level"], "moderate");
        assert!(MENU_HIGHLIGHTS.contains(&cafe["menu_highlights"][0].as_str().unwrap()));

        let notes_cafe = &kyoto["cafes"][1];
        assert_eq!(notes_cafe["vibe"], "quiet garden courtyard");
        assert_eq!(notes_cafe["noise_level"], "quiet");
    }

    #[test]
    fn missing_seasonality_means_all_year() {
        let mut data = json!({"countries": {"goa": {"cities": {"panaji": {
            "things_to_do": [{"title": "Spice Farm", "cost_range": "high"}]
        }}}}});
        enrich_dataset(&mut data, &Enrichments::default()).unwrap();
        let exp = &data["countries"]["goa"]["cities"]["panaji"]["things_to_do"][0];
        assert_eq!(exp["best_months"], json!(["All year"]));
        assert_eq!(exp["cost_estimate"]["level"], "high");
        assert_eq!(exp["crowd_score"], 40);
        assert_eq!(exp["duration_min_max"], json!({"min": 2, "max": 2, "unit": "hours"}));
    }

    #[test]
    fn durations_parse_from_free_text() {
        let hours = |min, max| DurationRange { min, max, unit: DurationUnit::Hours };
        assert_eq!(DurationRange::parse("2-3 hrs"), Some(hours(2, 3)));
        assert_eq!(DurationRange::parse("1 hour"), Some(hours(1, 1)));
        assert_eq!(
            DurationRange::parse("About 45 Minutes"),
            Some(DurationRange { min: 45, max: 45, unit: DurationUnit::Minutes })
        );
        assert_eq!(DurationRange::parse("half a day"), None);
        assert_eq!(DurationRange::parse("3 days"), None);
        assert_eq!(DurationRange::default(), hours(2, 3));
    }

    #[test]
    fn crowd_score_rules() {
        let popular = json!(["Popular"]);
        assert_eq!(crowd_score(None, None), 50);
        assert_eq!(crowd_score(Some(&popular), None), 75);
        assert_eq!(crowd_score(Some(&popular), Some("high")), 65);
        assert_eq!(crowd_score(Some(&json!("Popular")), Some("mid")), 50);
    }

    #[test]
    fn long_descriptions_get_a_teaser() {
        let long = "Wander through ten thousand vermilion gates as morning mist lifts off the \
                    forested slopes of Mount Inari and the city wakes below you";
        assert_eq!(
            sensory_subcopy(long),
            "Wander through ten thousand vermilion gates as morning mist lifts off the forested slopes..."
        );
        assert_eq!(sensory_subcopy("Short and sweet."), "Short and sweet.");
    }

    #[test]
    fn same_seed_same_dataset() {
        let mut a = sample();
        let mut b = sample();
        enrich_dataset_with(&mut a, &table(), &mut StdRng::seed_from_u64(7)).unwrap();
        enrich_dataset_with(&mut b, &table(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn existing_values_are_not_overwritten() {
        let mut data = json!({"countries": {"japan": {"description": "Mine."}}});
        enrich_dataset(&mut data, &table()).unwrap();
        assert_eq!(data["countries"]["japan"]["description"], "Mine.");
        assert_eq!(data["countries"]["japan"]["cost_range"], "mid-high");
    }

    #[test]
    fn rejects_datasets_without_countries() {
        let mut data = json!({"cities": []});
        assert!(matches!(
            enrich_dataset(&mut data, &Enrichments::default()),
            Err(EnrichError::Shape { .. })
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verso_demo_dataset.json");
        fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();

        let report = enrich_file(&path, &table()).unwrap();
        assert_eq!(report.cities, 1);

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["countries"]["japan"]["cities"]["kyoto"]["description"], "Ancient capital.");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = enrich_file(&dir.path().join("absent.json"), &Enrichments::default());
        assert!(matches!(result, Err(EnrichError::Io(_))));
    }

    proptest! {
        #[test]
        fn enrichment_is_idempotent(
            titles in prop::collection::vec("[A-Za-z ]{0,12}", 0..5),
            cost in prop::option::of(prop::sample::select(vec!["Free", "$", "$$", "$$$", "$$$$", "??"])),
            duration in prop::option::of("[0-9]{1,2}(-[0-9]{1,2})? ?(hrs|min|days)"),
            popular in any::<bool>(),
            cafe_name in "[A-Za-z% ]{0,12}",
            seed in any::<u64>(),
        ) {
            let tags = if popular { json!(["Popular"]) } else { json!([]) };
            let experiences: Vec<Value> = titles
                .iter()
                .map(|t| json!({
                    "title": t,
                    "cost": cost,
                    "duration": duration,
                    "tags": tags,
                    "specific_options": [{"name": t}]
                }))
                .collect();
            let mut data = json!({"countries": {"bali": {
                "themes": ["beach escapes"],
                "hero_image_keywords": ["uluwatu", "sunset"],
                "cities": {"ubud": {
                    "things_to_do": experiences,
                    "cafes": [{}, {"name": cafe_name, "notes": "slow mornings \u{2014} rice fields"}]
                }}
            }}});

            enrich_dataset_with(&mut data, &Enrichments::default(), &mut StdRng::seed_from_u64(seed)).unwrap();
            let once = data.clone();
            enrich_dataset_with(&mut data, &Enrichments::default(), &mut StdRng::seed_from_u64(seed ^ 1)).unwrap();
            prop_assert_eq!(once, data);
        }
    }
}
