//! Generation prompt construction
//!
//! The wording is tunable; callers only depend on the model answering with a
//! `{"name", "emoji"}` object.

const AUTHORING_RULES: &str = "\
Rules:
- The result is a dish, ingredient, or food concept, named in 1 to 4 words.
- Do not just join the two input names together; invent something a chef would recognize.
- Draw on real cuisines from around the world and be playful, but stay edible.
- Pick a single emoji that best represents the result.
Respond ONLY with a JSON object in this exact format: {\"name\": \"Dish Name\", \"emoji\": \"🍕\"}";

/// Describe one ingredient, with its parents when known
fn describe(name: &str, lineage: Option<&[String]>) -> String {
    match lineage.and_then(|parents| parents.split_last()) {
        Some((last, [])) => format!("\"{}\" (made from: {})", name, last),
        Some((last, init)) => {
            format!("\"{}\" (made from: {} and {})", name, init.join(", "), last)
        }
        None => format!("\"{}\"", name),
    }
}

/// Build the fusion prompt for two ingredients in the caller's order
pub fn build_prompt(
    ingredient_a: &str,
    lineage_a: Option<&[String]>,
    ingredient_b: &str,
    lineage_b: Option<&[String]>,
) -> String {
    format!(
        "You are a creative chef inventing fusion dishes. Combine {} and {} into a new dish, ingredient, or food concept.\n{}",
        describe(ingredient_a, lineage_a),
        describe(ingredient_b, lineage_b),
        AUTHORING_RULES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_lineage() {
        let prompt = build_prompt("Water", None, "Fire", None);
        assert!(prompt.contains("Combine \"Water\" and \"Fire\""));
        assert!(!prompt.contains("made from"));
        assert!(prompt.contains("{\"name\": \"Dish Name\", \"emoji\": \"🍕\"}"));
    }

    #[test]
    fn test_prompt_with_lineage() {
        let lineage = vec!["Water".to_string(), "Fire".to_string()];
        let prompt = build_prompt("Steam", Some(&lineage), "Rice", None);
        assert!(prompt.contains("\"Steam\" (made from: Water and Fire)"));
        assert!(prompt.contains("\"Rice\""));
    }

    #[test]
    fn test_empty_lineage_is_ignored() {
        let prompt = build_prompt("Steam", Some(&[]), "Rice", None);
        assert!(!prompt.contains("made from"));
    }

    #[test]
    fn test_long_lineage_joined() {
        let lineage = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(describe("X", Some(&lineage)), "\"X\" (made from: A, B and C)");
    }
}
