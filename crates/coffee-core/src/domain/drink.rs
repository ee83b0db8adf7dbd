//! 음료 도메인 모델.
//!
//! 음료는 제목과 레시피(재료 목록)로 구성되며 두 가지 표현을 가집니다:
//! - **short**: 공개 엔드포인트용. 재료 이름 없이 색상과 비율만 포함
//! - **long**: 권한이 있는 사용자용. 레시피 전체 포함

use serde::{Deserialize, Serialize};

/// 레시피를 구성하는 재료 하나.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Ingredient {
    /// 재료 이름
    pub name: String,
    /// 표시 색상 (예: "blue", "#6f4e37")
    pub color: String,
    /// 전체 대비 비율
    pub parts: u32,
}

impl Ingredient {
    /// 새 재료 생성.
    pub fn new(name: impl Into<String>, color: impl Into<String>, parts: u32) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            parts,
        }
    }

    /// 공개용 표현 (이름 제외).
    pub fn short(&self) -> IngredientShort {
        IngredientShort {
            color: self.color.clone(),
            parts: self.parts,
        }
    }
}

/// 공개용 재료 표현.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

/// 입력 시 허용하는 레시피 형식.
///
/// 클라이언트는 재료 배열 또는 재료 객체 하나를 보낼 수 있습니다.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Recipe {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(items) => Recipe(items),
            RecipeInput::One(item) => Recipe(vec![item]),
        }
    }
}

/// 순서가 있는 재료 목록.
///
/// JSON으로는 항상 배열로 직렬화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecipeInput")]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    /// 재료 목록으로 레시피 생성.
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    /// 재료 목록 참조.
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    /// 재료가 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 재료 수.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 공개용 레시피 (재료 이름 제외).
    pub fn short(&self) -> Vec<IngredientShort> {
        self.0.iter().map(Ingredient::short).collect()
    }

    /// 저장용 JSON 텍스트로 변환.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// 저장된 JSON 텍스트에서 복원.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// 저장된 음료.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    /// 음료 ID
    pub id: i64,
    /// 음료 제목 (고유)
    pub title: String,
    /// 레시피
    pub recipe: Recipe,
}

impl Drink {
    /// 공개용 short 표현.
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.short(),
        }
    }

    /// 상세 long 표현.
    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}

/// 음료 short 표현.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

/// 음료 long 표현.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// 새 음료 입력.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

impl NewDrink {
    pub fn new(title: impl Into<String>, recipe: Recipe) -> Self {
        Self {
            title: title.into(),
            recipe,
        }
    }
}

/// 음료 부분 수정 입력.
///
/// `None`인 필드는 기존 값을 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

impl DrinkPatch {
    /// 변경할 필드가 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}

/// 데이터베이스 초기화 시 넣는 기본 음료.
pub fn seed_drinks() -> Vec<NewDrink> {
    vec![NewDrink::new(
        "water",
        Recipe::new(vec![Ingredient::new("water", "blue", 1)]),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat_white() -> Drink {
        Drink {
            id: 3,
            title: "flatwhite".to_string(),
            recipe: Recipe::new(vec![
                Ingredient::new("espresso", "#6f4e37", 1),
                Ingredient::new("steamed milk", "white", 3),
            ]),
        }
    }

    #[test]
    fn test_short_hides_ingredient_names() {
        let json = serde_json::to_value(flat_white().short()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "title": "flatwhite",
                "recipe": [
                    {"color": "#6f4e37", "parts": 1},
                    {"color": "white", "parts": 3}
                ]
            })
        );
    }

    #[test]
    fn test_long_keeps_full_recipe() {
        let json = serde_json::to_value(flat_white().long()).unwrap();
        assert_eq!(json["recipe"][1]["name"], "steamed milk");
        assert_eq!(json["recipe"][1]["parts"], 3);
    }

    #[test]
    fn test_recipe_accepts_single_ingredient() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"name": "water", "color": "blue", "parts": 1}"#).unwrap();
        assert_eq!(recipe.len(), 1);
        assert_eq!(recipe.ingredients()[0].name, "water");
    }

    #[test]
    fn test_recipe_serializes_as_array() {
        let recipe = Recipe::new(vec![Ingredient::new("water", "blue", 1)]);
        assert_eq!(
            recipe.to_json().unwrap(),
            r#"[{"name":"water","color":"blue","parts":1}]"#
        );
        assert_eq!(Recipe::from_json(&recipe.to_json().unwrap()).unwrap(), recipe);
    }

    #[test]
    fn test_recipe_rejects_garbage() {
        assert!(serde_json::from_str::<Recipe>(r#""espresso""#).is_err());
        assert!(serde_json::from_str::<Recipe>(r#"[{"name": "x"}]"#).is_err());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(DrinkPatch::default().is_empty());
        let patch = DrinkPatch {
            title: Some("latte".into()),
            recipe: None,
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_seed_contains_water() {
        let seeds = seed_drinks();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].title, "water");
        assert_eq!(seeds[0].recipe.ingredients()[0].color, "blue");
    }

    proptest! {
        #[test]
        fn short_view_preserves_colors_and_parts(
            items in prop::collection::vec(("[a-z]{1,8}", "[a-z]{1,8}", 1u32..10), 0..6)
        ) {
            let recipe = Recipe::new(
                items.iter().map(|(n, c, p)| Ingredient::new(n.clone(), c.clone(), *p)).collect(),
            );
            let short = recipe.short();
            prop_assert_eq!(short.len(), recipe.len());
            for (s, full) in short.iter().zip(recipe.ingredients()) {
                prop_assert_eq!(&s.color, &full.color);
                prop_assert_eq!(s.parts, full.parts);
            }
        }
    }
}
