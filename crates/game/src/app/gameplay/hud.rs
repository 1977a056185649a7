use engine::{text_width, Canvas, Rgba8, GLYPH_HEIGHT};

use super::state::EngineState;

const WHITE: Rgba8 = [255, 255, 255, 255];
const HEART_RED: Rgba8 = [239, 68, 68, 255];
const PLATE_BG: Rgba8 = [0, 0, 0, 153];
const PLATE_BORDER: Rgba8 = [255, 255, 255, 51];
const GM_GREEN: Rgba8 = [34, 197, 94, 255];
const SHADOW: Rgba8 = [0, 0, 0, 255];
const DIALOGUE_BG: Rgba8 = [30, 58, 138, 242];
const HINT_YELLOW: Rgba8 = [253, 224, 71, 255];
const MODAL_DIM: Rgba8 = [0, 0, 0, 204];
const QUIZ_BG: Rgba8 = [88, 28, 135, 255];
const QUIZ_BORDER: Rgba8 = [236, 72, 153, 255];
const QUIZ_TITLE: Rgba8 = [249, 168, 212, 255];
const INPUT_BG: Rgba8 = [0, 0, 0, 255];
const INPUT_BORDER: Rgba8 = [168, 85, 247, 255];

const HEART_ROWS: [u8; 6] = [
    0b0110110, 0b1111111, 0b1111111, 0b0111110, 0b0011100, 0b0001000,
];
const HEART_SCALE: i32 = 3;
const TEXT_SCALE: i32 = 2;
const LINE_GAP: i32 = 4;

/// Overlay drawn in screen space on top of the world.
pub(crate) fn draw_hud(state: &EngineState, canvas: &mut Canvas<'_>) {
    canvas.reset_translation();
    draw_hearts(canvas, state.hearts());
    if let Some(level) = state.level() {
        let label = format!("AREA: {}", level.name);
        let width = text_width(&label, TEXT_SCALE) + 16;
        canvas.fill_rect(16, 44, width, 26, PLATE_BG);
        canvas.stroke_rect(16, 44, width, 26, 1, PLATE_BORDER);
        canvas.draw_text(24, 52, &label, TEXT_SCALE, WHITE);
    }
    if state.god_mode() {
        let width = text_width("GM", TEXT_SCALE) + 12;
        let x = canvas.width() as i32 - width - 16;
        canvas.fill_rect(x, 16, width, 22, PLATE_BG);
        canvas.stroke_rect(x, 16, width, 22, 1, GM_GREEN);
        canvas.draw_text(x + 6, 22, "GM", TEXT_SCALE, GM_GREEN);
    }
    if let Some(banner) = state.banner() {
        draw_banner(canvas, &banner.text);
    }
    if let Some(dialogue) = state.dialogue() {
        draw_dialogue(canvas, dialogue.current_line());
    }
    if let Some(quiz) = state.quiz() {
        draw_quiz(canvas, &quiz.question, &quiz.input);
    }
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than a
/// line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(index, _)| index);
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Characters of `scale` text that fit in `width` pixels.
pub(crate) fn chars_fitting(width: i32, scale: i32) -> usize {
    let advance = (engine::GLYPH_WIDTH + 1) * scale.max(1);
    ((width + scale) / advance).max(1) as usize
}

pub(crate) fn draw_centered(canvas: &mut Canvas<'_>, y: i32, text: &str, scale: i32, color: Rgba8) {
    let x = (canvas.width() as i32 - text_width(text, scale)) / 2;
    canvas.draw_text(x, y, text, scale, color);
}

fn draw_hearts(canvas: &mut Canvas<'_>, hearts: u32) {
    for index in 0..hearts.min(20) as i32 {
        let origin_x = 16 + index * (8 * HEART_SCALE);
        for (row, bits) in HEART_ROWS.iter().enumerate() {
            for col in 0..7 {
                if bits & (1 << (6 - col)) == 0 {
                    continue;
                }
                canvas.fill_rect(
                    origin_x + col * HEART_SCALE,
                    16 + row as i32 * HEART_SCALE,
                    HEART_SCALE,
                    HEART_SCALE,
                    HEART_RED,
                );
            }
        }
    }
}

fn draw_banner(canvas: &mut Canvas<'_>, text: &str) {
    let max_width = canvas.width() as i32 - 32;
    let scale = [5, 4, 3, 2]
        .into_iter()
        .find(|scale| text_width(text, *scale) <= max_width)
        .unwrap_or(1);
    let y = (canvas.height() as i32 - GLYPH_HEIGHT * scale) / 2;
    let x = (canvas.width() as i32 - text_width(text, scale)) / 2;
    canvas.draw_text(x + scale, y + scale, text, scale, SHADOW);
    canvas.draw_text(x, y, text, scale, WHITE);
}

fn draw_dialogue(canvas: &mut Canvas<'_>, line: &str) {
    let box_width = 600_i32.min(canvas.width() as i32 * 9 / 10);
    let scale = TEXT_SCALE + 1;
    let lines = wrap_text(line, chars_fitting(box_width - 48, scale));
    let line_height = GLYPH_HEIGHT * scale + LINE_GAP * 2;
    let box_height = 24 + lines.len() as i32 * line_height + 40;
    let x = (canvas.width() as i32 - box_width) / 2;
    let y = canvas.height() as i32 - 48 - box_height;

    canvas.fill_rect(x, y, box_width, box_height, DIALOGUE_BG);
    canvas.stroke_rect(x, y, box_width, box_height, 4, WHITE);
    for (index, text) in lines.iter().enumerate() {
        canvas.draw_text(x + 24, y + 24 + index as i32 * line_height, text, scale, WHITE);
    }
    let hint = "PRESS SPACE";
    let hint_x = x + box_width - 24 - text_width(hint, TEXT_SCALE);
    canvas.draw_text(
        hint_x,
        y + box_height - 24,
        hint,
        TEXT_SCALE,
        HINT_YELLOW,
    );
}

fn draw_quiz(canvas: &mut Canvas<'_>, question: &str, input: &str) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    canvas.fill_rect(0, 0, width, height, MODAL_DIM);

    let box_width = 448_i32.min(width - 32);
    let scale = TEXT_SCALE;
    let inner_width = box_width - 48;
    let question_lines = wrap_text(question, chars_fitting(inner_width, scale + 1));
    let line_height = GLYPH_HEIGHT * (scale + 1) + LINE_GAP * 2;
    let box_height = 24 + 24 + question_lines.len() as i32 * line_height + 16 + 40 + 24 + 24;
    let x = (width - box_width) / 2;
    let y = (height - box_height) / 2;

    canvas.fill_rect(x, y, box_width, box_height, QUIZ_BG);
    canvas.stroke_rect(x, y, box_width, box_height, 4, QUIZ_BORDER);
    canvas.draw_text(x + 24, y + 24, "HARVEY'S CHALLENGE", scale, QUIZ_TITLE);

    let mut cursor_y = y + 48;
    for line in &question_lines {
        canvas.draw_text(x + 24, cursor_y, line, scale + 1, WHITE);
        cursor_y += line_height;
    }
    cursor_y += 16;

    canvas.fill_rect(x + 24, cursor_y, inner_width, 40, INPUT_BG);
    canvas.stroke_rect(x + 24, cursor_y, inner_width, 40, 2, INPUT_BORDER);
    let visible = tail_fitting(input, chars_fitting(inner_width - 24, scale).saturating_sub(1));
    let typed = if input.is_empty() {
        canvas.draw_text(x + 36, cursor_y + 15, "Type answer...", scale, INPUT_BORDER);
        0
    } else {
        canvas.draw_text(x + 36, cursor_y + 15, visible, scale, WHITE)
    };
    canvas.draw_text(x + 36 + typed + scale * 2, cursor_y + 15, "_", scale, WHITE);
    canvas.draw_text(
        x + 24,
        cursor_y + 40 + 16,
        "ENTER TO ANSWER",
        scale,
        QUIZ_TITLE,
    );
}

/// Last `max_chars` characters of `text`, so long answers keep the caret
/// in view.
fn tail_fitting(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    text.char_indices()
        .nth(skip)
        .map_or("", |(index, _)| &text[index..])
}
