//! Prompt templates and the recipe output schema.
//!
//! All prompts are in Brazilian Portuguese; the generated content is
//! displayed as-is.

use core_library::{Difficulty, RecipeMode};
use serde_json::{json, Value};

/// Persona and drink-pairing guidance sent with every recipe request.
pub const CHEF_SYSTEM_INSTRUCTION: &str = "Você é um Chef renomado especialista em culinária \
do Nordeste brasileiro. Suas receitas são autênticas, respeitam as tradições locais e incluem \
uma breve história cultural do prato. Além da receita, sugira uma lista variada de bebidas para \
harmonizar, incluindo sucos de frutas tropicais (caju, umbu, graviola, seriguela), refrigerantes \
regionais (como Guaraná Jesus), diferentes tipos de cachaças artesanais ou até café coado se for \
o caso.";

/// Preamble prepended to the text handed to the speech model.
pub const NARRATION_PREAMBLE: &str = "Narração da receita: ";

/// Build the recipe prompt for `query` under `mode`.
pub fn recipe_prompt(query: &str, mode: RecipeMode) -> String {
    match mode {
        RecipeMode::Traditional => format!(
            "Gere uma receita detalhada de comida nordestina baseada em: {}. \
             A resposta deve estar em português do Brasil.",
            query
        ),
        RecipeMode::Pantry => format!(
            "Crie uma receita criativa e autêntica da culinária nordestina brasileira usando \
             EXCLUSIVAMENTE ou como base principal estes ingredientes que tenho em casa: {}. \
             Você pode assumir que o usuário tem itens básicos como sal, óleo e água. \
             A resposta deve estar em português do Brasil.",
            query
        ),
    }
}

pub fn image_prompt(title: &str) -> String {
    format!(
        "Uma foto profissional e apetitosa de um prato de {}, culinária nordestina brasileira, \
         iluminação natural, close-up, apresentação em cerâmica rústica.",
        title
    )
}

pub fn narration_prompt(text: &str) -> String {
    format!("{}{}", NARRATION_PREAMBLE, text)
}

/// Structured-output schema for a recipe, in the backend's OpenAPI subset.
pub fn recipe_schema() -> Value {
    let difficulties: Vec<&str> = Difficulty::ALL.iter().map(Difficulty::label).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
            "instructions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "history": { "type": "STRING", "description": "Breve história cultural do prato" },
            "cookingTime": { "type": "STRING" },
            "difficulty": { "type": "STRING", "enum": difficulties },
            "drinkPairings": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Sugestões de bebidas para acompanhar (sucos, refrigerantes regionais, cachaças)"
            }
        },
        "required": [
            "title",
            "description",
            "ingredients",
            "instructions",
            "history",
            "cookingTime",
            "difficulty",
            "drinkPairings"
        ]
    })
}
