use crate::models::NutritionFact;

/// Static reference foods. Built once and never mutated; iteration order is
/// insertion order, which is also the tie-break order when ranking matches.
#[derive(Debug, Clone)]
pub struct FoodDictionary {
    facts: Vec<NutritionFact>,
}

#[allow(clippy::too_many_arguments)]
fn fact(
    key: &str,
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    serving: &str,
    category: &str,
    aliases: &[&str],
) -> NutritionFact {
    NutritionFact {
        key: key.to_string(),
        name: name.to_string(),
        calories,
        protein_grams: protein,
        carb_grams: carbs,
        fat_grams: fat,
        serving_size_description: serving.to_string(),
        category: category.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

impl FoodDictionary {
    pub fn new() -> Self {
        let facts = vec![
            fact("apple", "Apple", 95.0, 0.5, 25.0, 0.3, "1 medium (182g)", "Fruits",
                 &["red apple", "green apple", "granny smith"]),
            fact("banana", "Banana", 105.0, 1.3, 27.0, 0.4, "1 medium (118g)", "Fruits",
                 &["yellow banana", "ripe banana"]),
            fact("chicken_breast", "Chicken Breast", 231.0, 43.5, 0.0, 5.0, "100g cooked", "Protein",
                 &["grilled chicken", "chicken breast", "cooked chicken"]),
            fact("rice", "White Rice", 205.0, 4.3, 45.0, 0.4, "1 cup cooked (158g)", "Grains",
                 &["white rice", "steamed rice", "cooked rice"]),
            fact("broccoli", "Broccoli", 55.0, 3.7, 11.0, 0.6, "1 cup chopped (91g)", "Vegetables",
                 &["green broccoli", "steamed broccoli"]),
            fact("salmon", "Salmon", 231.0, 25.4, 0.0, 13.4, "100g cooked", "Protein",
                 &["grilled salmon", "baked salmon", "salmon fillet"]),
            fact("oatmeal", "Oatmeal", 300.0, 10.0, 54.0, 6.0, "1 cup cooked", "Grains",
                 &["oats", "porridge", "rolled oats"]),
            fact("eggs", "Eggs", 155.0, 13.0, 1.1, 10.6, "2 large eggs", "Protein",
                 &["scrambled eggs", "boiled eggs", "fried eggs"]),
            fact("avocado", "Avocado", 234.0, 2.9, 12.0, 21.0, "1 medium (150g)", "Fruits",
                 &["fresh avocado", "ripe avocado"]),
            fact("greek_yogurt", "Greek Yogurt", 100.0, 17.0, 6.0, 0.0, "170g container", "Dairy",
                 &["plain greek yogurt", "non-fat greek yogurt"]),
        ];

        log::debug!("📚 Food dictionary loaded with {} entries", facts.len());
        Self { facts }
    }

    pub fn get(&self, key: &str) -> Option<&NutritionFact> {
        self.facts.iter().find(|f| f.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NutritionFact> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }
}

impl Default for FoodDictionary {
    fn default() -> Self {
        Self::new()
    }
}
