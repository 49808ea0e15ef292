use serde_json::{Map, Value};

/// Lays a stored (possibly partial) document over its defaults.
///
/// Top level: every stored key replaces the default key, unknown keys are
/// kept. Then each named section is rebuilt as the default section with the
/// stored section's fields on top. Merging stops there: anything nested deeper
/// inside a section is replaced as a whole. Null fields count as absent, and a
/// stored section that is not an object is dropped in favour of the default.
pub fn overlay(defaults: &Value, stored: &Value, sections: &[&str]) -> Value {
    let mut merged = match defaults {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    if let Value::Object(stored_map) = stored {
        for (key, value) in stored_map {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    for section in sections {
        let Some(Value::Object(default_section)) = defaults.get(*section) else {
            continue;
        };

        let mut section_map = default_section.clone();
        if let Some(Value::Object(stored_section)) = stored.get(*section) {
            for (field, value) in stored_section {
                if !value.is_null() {
                    section_map.insert(field.clone(), value.clone());
                }
            }
        }
        merged.insert(section.to_string(), Value::Object(section_map));
    }

    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Value {
        json!({
            "hero": { "title": "Hello", "subtitle": "World", "image": "/a.png" },
            "blog": { "title": "Writing" },
            "version": 1
        })
    }

    #[test]
    fn missing_section_falls_back_to_default() {
        let merged = overlay(&defaults(), &json!({ "blog": { "title": "Notes" } }), &["hero", "blog"]);
        assert_eq!(merged["hero"], defaults()["hero"]);
        assert_eq!(merged["blog"]["title"], "Notes");
    }

    #[test]
    fn partial_section_keeps_new_default_fields() {
        let stored = json!({ "hero": { "title": "Hey There!" } });
        let merged = overlay(&defaults(), &stored, &["hero", "blog"]);
        assert_eq!(
            merged["hero"],
            json!({ "title": "Hey There!", "subtitle": "World", "image": "/a.png" })
        );
    }

    #[test]
    fn nested_objects_inside_a_section_are_replaced_not_merged() {
        let defaults = json!({ "hero": { "cta": { "label": "Go", "href": "/" } } });
        let stored = json!({ "hero": { "cta": { "label": "Start" } } });
        let merged = overlay(&defaults, &stored, &["hero"]);
        assert_eq!(merged["hero"]["cta"], json!({ "label": "Start" }));
    }

    #[test]
    fn unknown_top_level_keys_survive() {
        let merged = overlay(&defaults(), &json!({ "legacyFlag": true, "version": 2 }), &["hero"]);
        assert_eq!(merged["legacyFlag"], true);
        assert_eq!(merged["version"], 2);
    }

    #[test]
    fn non_object_section_and_null_fields_are_ignored() {
        let stored = json!({ "hero": "oops", "blog": { "title": null } });
        let merged = overlay(&defaults(), &stored, &["hero", "blog"]);
        assert_eq!(merged["hero"], defaults()["hero"]);
        assert_eq!(merged["blog"]["title"], "Writing");
    }
}
