use serde::{Deserialize, Serialize};

/// Which action space the model is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptProfile {
    #[default]
    Computer,
    Mobile,
    Grounding,
}

const COMPUTER_USE: &str = r#"You are a GUI agent. You are given a task and your action history, with screenshots. You need to perform the next action to complete the task.

## Output Format
```
Thought: ...
Action: ...
```

## Action Space

click(point='<point>x1 y1</point>')
left_double(point='<point>x1 y1</point>')
right_single(point='<point>x1 y1</point>')
drag(start_point='<point>x1 y1</point>', end_point='<point>x2 y2</point>')
hotkey(key='ctrl c') # Split keys with a space and use lowercase. Also, do not use more than 3 keys in one hotkey action.
type(content='xxx') # Use escape characters \', \", and \n in content part to ensure we can parse the content in normal python string format. If you want to submit your input, use \n at the end of content.
scroll(point='<point>x1 y1</point>', direction='down or up or right or left') # Show more information on the `direction` side.
wait() #Sleep for 5s and take a screenshot to check for any changes.
finished(content='xxx') # Use escape characters \', \", and \n in content part to ensure we can parse the content in normal python string format.


## Note
- Use {language} in `Thought` part.
- Write a small plan and finally summarize your next action (with its target element) in one sentence in `Thought` part.

## User Instruction
{instruction}
"#;

const MOBILE_USE: &str = r#"You are a GUI agent. You are given a task and your action history, with screenshots. You need to perform the next action to complete the task.

## Output Format
```
Thought: ...
Action: ...
```

## Action Space

click(point='<point>x1 y1</point>')
long_press(point='<point>x1 y1</point>')
type(content='') #If you want to submit your input, use "\n" at the end of `content`.
scroll(point='<point>x1 y1</point>', direction='down or up or right or left')
open_app(app_name='')
drag(start_point='<point>x1 y1</point>', end_point='<point>x2 y2</point>')
press_home()
press_back()
finished(content='xxx') # Use escape characters \', \", and \n in content part to ensure we can parse the content in normal python string format.


## Note
- Use {language} in `Thought` part.
- Write a small plan and finally summarize your next action (with its target element) in one sentence in `Thought` part.

## User Instruction
{instruction}
"#;

const GROUNDING: &str = r#"You are a GUI agent. You are given a task and your action history, with screenshots. You need to perform the next action to complete the task.

## Output Format

Action: ...


## Action Space
click(point='<point>x1 y1</point>')

## User Instruction
{instruction}
"#;

impl PromptProfile {
    fn template(self) -> &'static str {
        match self {
            PromptProfile::Computer => COMPUTER_USE,
            PromptProfile::Mobile => MOBILE_USE,
            PromptProfile::Grounding => GROUNDING,
        }
    }
}

/// Render the desktop prompt with an English `Thought` section.
pub fn build(instruction: &str) -> String {
    build_with(PromptProfile::Computer, "English", instruction)
}

/// The instruction is substituted last so placeholder-looking text inside it
/// is never expanded.
pub fn build_with(profile: PromptProfile, language: &str, instruction: &str) -> String {
    profile
        .template()
        .replace("{language}", language)
        .replace("{instruction}", instruction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_lands_in_user_section() {
        let prompt = build("Open the settings window");
        assert!(prompt.ends_with("## User Instruction\nOpen the settings window\n"));
        assert!(prompt.contains("Use English in `Thought` part."));
        assert!(prompt.contains("drag(start_point="));
        assert!(!prompt.contains("{instruction}"));
    }

    #[test]
    fn instruction_is_opaque_text() {
        let prompt = build_with(PromptProfile::Computer, "Chinese", "type '{language}' then \\n");
        assert!(prompt.contains("Use Chinese in `Thought` part."));
        assert!(prompt.contains("type '{language}' then \\n"));
    }

    #[test]
    fn mobile_profile_lists_mobile_actions() {
        let prompt = build_with(PromptProfile::Mobile, "English", "go home");
        assert!(prompt.contains("press_home()"));
        assert!(prompt.contains("open_app(app_name='')"));
        assert!(!prompt.contains("hotkey("));
    }

    #[test]
    fn grounding_profile_has_no_thought_section() {
        let prompt = build_with(PromptProfile::Grounding, "English", "the OK button");
        assert!(!prompt.contains("Thought:"));
        assert!(prompt.contains("the OK button"));
    }
}
