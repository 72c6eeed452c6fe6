//! Fixed instruction texts handed to the calling agent

/// Name under which the spoken-keypoints prompt is published
pub const SPOKEN_KEYPOINTS_PROMPT_NAME: &str = "spoken_keypoints_prompt";

/// How to turn a full reply into something worth hearing
pub const SPOKEN_KEYPOINTS_PROMPT: &str = "\
When preparing text to be spoken aloud, follow these rules:

1. Keep only the key points of your reply, never the full text.
2. Use short, natural spoken sentences, at most two per point.
3. No markdown, lists, bullet symbols or code blocks.
4. Sound like a person giving a quick verbal summary, not someone reading a document.
5. Aim for three to five sentences in total; one or two is fine for a simple answer.
6. Skip openers like \"In summary\" or \"To summarize\" and just make the point.
7. Link ideas the way people talk: \"Also,\", \"One thing to note:\", \"The main idea is\", \"Keep in mind that\".

Example full reply:
  \"The ESP32-S3 supports Wi-Fi 802.11 b/g/n and Bluetooth 5.0 LE.
   It has 512KB SRAM and up to 16MB flash. It's well-suited for IoT
   applications requiring both wireless protocols...\"

Spoken keypoints:
  \"The ESP32-S3 has Wi-Fi and Bluetooth 5 built in.
   It has plenty of memory for most IoT projects.
   A solid pick when you need both radios on one chip.\"
";

/// Sent with the `initialize` result
pub const SERVER_INSTRUCTIONS: &str = "\
Speaks replies aloud. Call list_templates first: when a template fits the moment, \
use play_template instead of speak. Before speak, distill the reply into two to five \
spoken keypoints (see the spoken_keypoints_prompt prompt). Use speak_raw only for \
short confirmations that need no distillation.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_has_no_markdown_headers() {
        assert!(!SPOKEN_KEYPOINTS_PROMPT.contains('#'));
        assert!(SPOKEN_KEYPOINTS_PROMPT.starts_with("When preparing text"));
    }
}
