//! Instruction templates sent to the model for each task.

use thiserror::Error;

use super::TaskChoice;

/// Input rejected before anything is sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("percentage input needs exactly two values, got {found}")]
    PercentageShape { found: usize },
}

impl PromptError {
    /// Message shown to the user so they can retry in place.
    pub fn guidance(&self) -> &'static str {
        match self {
            PromptError::PercentageShape { .. } => {
                "Ошибка: введите два числа через пробел, например: 200 15"
            }
        }
    }
}

/// Build the model instruction for `task` from the user's raw text.
///
/// Only the percentage task checks shape (two whitespace-separated values);
/// everything else is forwarded as-is. No arithmetic happens here.
pub fn build_prompt(task: TaskChoice, raw: &str) -> Result<String, PromptError> {
    let text = raw.trim();
    let prompt = match task {
        TaskChoice::SolveEquation => format!(
            "Реши уравнение «{text}» и подробно опиши шаги для ученика 1–9 класса. \
             Включи проверку ответа."
        ),
        TaskChoice::Percentage => {
            let parts: Vec<&str> = text.split_whitespace().collect();
            let [number, percent] = parts.as_slice() else {
                return Err(PromptError::PercentageShape { found: parts.len() });
            };
            format!("Вычисли {percent}% от {number}. Поясни шаги для ученика 1–9 класса.")
        }
        TaskChoice::CircleArea => format!(
            "Найди площадь круга с радиусом {text}. \
             Покажи формулу, подставь значения, объясни шаги."
        ),
        TaskChoice::FreeForm => format!(
            "Реши задачу: «{text}». Объясни подробно шаги, чтобы понял ученик 1–9 класса."
        ),
    };
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_percentage_prompt() {
        let prompt = build_prompt(TaskChoice::Percentage, "200 15").expect("valid input");
        assert!(prompt.contains("15% от 200"));
    }

    #[test]
    fn test_percentage_tolerates_extra_spacing() {
        let prompt = build_prompt(TaskChoice::Percentage, "  200 \t 15 \n").expect("valid input");
        assert!(prompt.starts_with("Вычисли 15% от 200."));
    }

    #[rstest]
    #[case("200", 1)]
    #[case("", 0)]
    #[case("200 15 3", 3)]
    fn test_percentage_rejects_wrong_shape(#[case] raw: &str, #[case] found: usize) {
        let err = build_prompt(TaskChoice::Percentage, raw).expect_err("should reject");
        assert_eq!(err, PromptError::PercentageShape { found });
        assert!(err.guidance().contains("200 15"));
    }

    #[test]
    fn test_percentage_shape_only() {
        // Non-numeric tokens pass through; the model deals with them.
        let prompt = build_prompt(TaskChoice::Percentage, "сто пять").expect("two tokens");
        assert!(prompt.contains("пять% от сто"));
    }

    #[rstest]
    #[case(TaskChoice::SolveEquation, "3x + 5 = 11", "«3x + 5 = 11»")]
    #[case(TaskChoice::CircleArea, "5", "радиусом 5.")]
    #[case(TaskChoice::FreeForm, "У Маши 3 яблока", "«У Маши 3 яблока»")]
    fn test_text_is_embedded(#[case] task: TaskChoice, #[case] raw: &str, #[case] needle: &str) {
        let prompt = build_prompt(task, raw).expect("accepted");
        assert!(prompt.contains(needle), "{prompt}");
    }

    #[test]
    fn test_input_is_trimmed() {
        let prompt = build_prompt(TaskChoice::CircleArea, "  7 \n").expect("accepted");
        assert!(prompt.contains("радиусом 7."));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        for task in TaskChoice::ALL {
            let first = build_prompt(task, "12 30");
            let second = build_prompt(task, "12 30");
            assert_eq!(first, second);
        }
    }
}
