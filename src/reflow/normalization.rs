// WHY: standalone normalization so the merge engine and tests share one definition
// of what a "clean" paragraph looks like

/// Characters that attach to the preceding word; the whitespace character before them is removed
pub const GLUED_PUNCTUATION: &[char] = &['.', ',', ':', ';', '-'];

fn is_glued_punctuation(ch: char) -> bool {
    GLUED_PUNCTUATION.contains(&ch)
}

/// Normalize a raw paragraph: tabs become spaces, a period followed by two spaces keeps one,
/// the whitespace character right before `.,:;-` is removed, runs of two or more whitespace
/// characters collapse to one space, and the ends are trimmed.
pub fn normalize_paragraph(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_paragraph_into(text, &mut result);
    result
}

/// Normalize paragraph into supplied buffer to avoid allocation
/// WHY: the reflower normalizes every input paragraph, so one scratch buffer is reused
pub fn normalize_paragraph_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    // Whitespace run currently being skipped: length, first character, and whether
    // its first two characters are both spaces once tabs are replaced
    let mut run_len = 0usize;
    let mut run_first = ' ';
    let mut run_opens_with_two_spaces = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            let ch = if ch == '\t' { ' ' } else { ch };
            match run_len {
                0 => run_first = ch,
                1 => run_opens_with_two_spaces = run_first == ' ' && ch == ' ',
                _ => {}
            }
            run_len += 1;
            continue;
        }

        if run_len > 0 {
            // Leading runs vanish (trim)
            if !buffer.is_empty() {
                let mut kept = run_len;
                // ".  " keeps a single space after the period
                if run_opens_with_two_spaces && buffer.ends_with('.') {
                    kept -= 1;
                }
                // Glued punctuation swallows the one whitespace character in front of it
                if is_glued_punctuation(ch) {
                    kept -= 1;
                }
                // WHY: a lone survivor (e.g. a soft line break) is kept as is;
                // runs of two or more collapse to one space
                match kept {
                    0 => {}
                    1 => buffer.push(run_first),
                    _ => buffer.push(' '),
                }
            }
            run_len = 0;
            run_opens_with_two_spaces = false;
        }

        buffer.push(ch);
    }
    // A trailing run is never flushed, which trims the end
}
