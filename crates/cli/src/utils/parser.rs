/// A cursor given on the command line as `LINE[:COL]`, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePosition {
    pub line: usize,
    pub column: Option<usize>,
}

fn parse_number(part: &str) -> Option<usize> {
    part.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Split `path[:line[:col]]` into its parts. Anything that doesn't parse as a
/// position stays part of the path.
pub fn parse_filepath_with_position(filepath_arg: &str) -> (String, Option<LinePosition>) {
    if let Some((rest, last)) = filepath_arg.rsplit_once(':') {
        if let Some(last_num) = parse_number(last) {
            if let Some((path, line_part)) = rest.rsplit_once(':') {
                if let Some(line) = parse_number(line_part) {
                    return (
                        path.to_string(),
                        Some(LinePosition {
                            line,
                            column: Some(last_num),
                        }),
                    );
                }
            }
            return (
                rest.to_string(),
                Some(LinePosition {
                    line: last_num,
                    column: None,
                }),
            );
        }
    }
    (filepath_arg.to_string(), None)
}
