//! The fixed menu of tutoring tasks.

use std::fmt;

/// One entry of the tutoring menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskChoice {
    SolveEquation,
    Percentage,
    CircleArea,
    FreeForm,
}

impl TaskChoice {
    /// Menu order, top to bottom.
    pub const ALL: [TaskChoice; 4] = [
        TaskChoice::SolveEquation,
        TaskChoice::Percentage,
        TaskChoice::CircleArea,
        TaskChoice::FreeForm,
    ];

    /// Button label shown in the menu keyboard.
    pub fn label(self) -> &'static str {
        match self {
            TaskChoice::SolveEquation => "Решить уравнение",
            TaskChoice::Percentage => "Вычислить процент",
            TaskChoice::CircleArea => "Найти площадь круга",
            TaskChoice::FreeForm => "Своя задача",
        }
    }

    /// What the bot asks for once the task is selected.
    pub fn input_prompt(self) -> &'static str {
        match self {
            TaskChoice::SolveEquation => "Введите уравнение, например: 3x + 5 = 11",
            TaskChoice::Percentage => {
                "Введите два числа через пробел: число и процент, например: 200 15"
            }
            TaskChoice::CircleArea => "Введите радиус круга, например: 5",
            TaskChoice::FreeForm => "Напишите текст задачи (в одно сообщение).",
        }
    }

    /// Match a menu label exactly. Labels arrive verbatim from keyboard
    /// buttons, so no normalization beyond surrounding whitespace.
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|task| task.label() == text)
    }

    /// Short machine-friendly name used in logs and on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            TaskChoice::SolveEquation => "equation",
            TaskChoice::Percentage => "percentage",
            TaskChoice::CircleArea => "circle",
            TaskChoice::FreeForm => "free",
        }
    }
}

impl fmt::Display for TaskChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
