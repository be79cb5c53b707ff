//! Member names to generated identifiers.

/// Substitutions applied to every character of a member name. Characters not
/// listed are kept as they are.
pub const SUBSTITUTIONS: [(char, char); 19] = [
    (' ', '_'),
    ('=', 'e'),
    ('+', 'p'),
    ('-', 'm'),
    ('*', 's'),
    ('/', 'd'),
    ('%', 'c'),
    ('&', 'a'),
    ('|', 'f'),
    ('^', 'r'),
    ('<', 'l'),
    ('>', 'g'),
    ('~', 't'),
    ('!', 'b'),
    ('[', 'h'),
    (']', 'i'),
    ('(', 'j'),
    (')', 'k'),
    ('.', 'n'),
];

/// Valid identifier from a member function name: `operator+=` becomes
/// `operatorpe`, `operator int` becomes `operator_int`.
///
/// Different names may map to the same identifier (`operator+` and
/// `operatorp`); the occurrence index appended by the descriptor builder
/// keeps generated names apart.
pub fn valid_ident(name: &str) -> String {
    name.chars().map(substitute).collect()
}

fn substitute(c: char) -> char {
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map_or(c, |&(_, to)| to)
}
