//! Rubric prompt sent to the scoring model.

use nutriscan_core::NutritionRecord;

pub const SYSTEM_INSTRUCTION: &str = "You are a nutrition scoring assistant. \
Score products on their nutritional value using the guidelines you are given.";

const RUBRIC: &str = "\
Score the product below from 0 to 100 and explain the score.

Start from a base score of 50, apply every rule that the data supports, and \
clamp the result to 0-100. Values are per serving unless the key says \
otherwise (for example `_100g`).

Calories: 0-150 +20, 151-300 +10, 301-500 +5, above 500 +0.
Protein: 15g or more +15, 8-14g +10, 3-7g +5, 0-2g +0.
Sugar: 0-5g +15, 6-15g +10, 16-25g +5, above 25g -10.
Fiber: 8g or more +15, 4-7g +10, 2-3g +5, 0-1g +0.
Fat: 0-5g +10, 6-15g +5, 16-25g +0, above 25g -10.
Sodium: 0-200mg +10, 201-600mg +5, 601-1200mg +0, above 1200mg -10.
Vitamins and minerals: rich +10, some +5, none listed +0.
Additives and preservatives: none +5, few +2, many -5.

Bonus: organic +5, non-GMO +3, whole grains +5, natural ingredients +3.
Penalty: trans fats -15, high fructose corn syrup -10, artificial colors or \
flavors -5.

The comment should explain the score, point out health benefits and \
concerns, and give recommendations.";

const OUTPUT_FORMAT: &str = "\
Reply with a single JSON object and nothing else:
{\"score\": <integer 0-100>, \"comment\": \"<explanation>\"}";

/// Builds the user prompt for `record`.
#[must_use]
pub fn build_prompt(record: &NutritionRecord) -> String {
    format!(
        "{RUBRIC}\n\nNutrition data:\n{}\n\n{OUTPUT_FORMAT}",
        record.to_pretty_json()
    )
}
