use super::provider::Prompt;
use crate::recipes::repo_types::Category;

const CHEF: &str = "You are an expert chef who suggests creative, tasty recipes \
                    based on the ingredients a home cook has at hand.";

fn category_list() -> String {
    Category::ALL
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn suggestion(ingredients: &str, language: &str) -> Prompt {
    Prompt {
        system: format!("{CHEF} Always answer in {language}."),
        user: format!(
            "Suggest a delicious recipe using these ingredients: {ingredients}. \
             Give the title, the full list of ingredients needed, and step-by-step \
             preparation instructions."
        ),
    }
}

pub fn structured(ingredients: &str, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "{CHEF} Answer ONLY with a JSON object, no commentary. \
             Write every value in {language}."
        ),
        user: format!(
            "Create a complete recipe with these ingredients: {ingredients}\n\n\
             Use exactly this structure:\n\
             {{\n  \
               \"title\": \"recipe name\",\n  \
               \"ingredients\": \"every ingredient with quantities, one per line\",\n  \
               \"instructions\": \"step-by-step instructions, one step per line\",\n  \
               \"category\": \"one of: {}\"\n\
             }}\n\n\
             Include ALL the ingredients the recipe needs, not only the ones given.",
            category_list()
        ),
    }
}
