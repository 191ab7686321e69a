//! Parser for the plain-text question corpus format.
//!
//! A corpus is a sequence of blocks separated by blank lines. Each
//! block holds exactly six non-empty lines: the question, the canonical
//! correct answer, then four candidate options. Blocks with any other
//! shape are skipped with a warning rather than failing the whole set.

use tracing::warn;

use crate::state::game::Question;

const BLOCK_LINES: usize = 6;

/// Parse a corpus into questions, dropping malformed blocks.
pub fn parse_corpus(input: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_no = 0;

    let mut flush = |block: &mut Vec<&str>, questions: &mut Vec<Question>| {
        if block.is_empty() {
            return;
        }
        block_no += 1;
        if block.len() != BLOCK_LINES {
            warn!(
                block = block_no,
                lines = block.len(),
                "skipping malformed question block"
            );
            block.clear();
            return;
        }
        questions.push(Question {
            text: block[0].to_owned(),
            correct_answer: block[1].to_owned(),
            options: [
                block[2].to_owned(),
                block[3].to_owned(),
                block[4].to_owned(),
                block[5].to_owned(),
            ],
        });
        block.clear();
    };

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut block, &mut questions);
        } else {
            block.push(line);
        }
    }
    flush(&mut block, &mut questions);
    questions
}

#[cfg(test)]
mod tests {
    use super::parse_corpus;

    const CORPUS: &str = "\
Who baptized Poland in 966?
Mieszko I
Mieszko I
Boleslaw Chrobry
Kazimierz Wielki
Wladyslaw Jagiello

What is the capital of Lower Silesia?
Wroclaw
Poznan
Wroclaw
Opole
Katowice
";

    #[test]
    fn parses_well_formed_blocks() {
        let questions = parse_corpus(CORPUS);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, "Mieszko I");
        assert_eq!(questions[1].text, "What is the capital of Lower Silesia?");
        assert_eq!(questions[1].options[1], "Wroclaw");
    }

    #[test]
    fn malformed_blocks_are_skipped_not_fatal() {
        let corpus = "only\nthree\nlines\n\nWho?\nX\nX\nY\nZ\nW\n";
        let questions = parse_corpus(corpus);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Who?");
    }

    #[test]
    fn tolerates_crlf_and_extra_blank_lines() {
        let corpus = "Q?\r\nA\r\nA\r\nB\r\nC\r\nD\r\n\r\n\r\n";
        let questions = parse_corpus(corpus);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options[3], "D");
    }

    #[test]
    fn empty_input_yields_no_questions() {
        assert!(parse_corpus("").is_empty());
        assert!(parse_corpus("\n\n\n").is_empty());
    }
}
