//! Named character reference lookup table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
//!
//! The standard defines 2,231 entities; this table carries the ones that
//! show up in hand-written templates. Unknown references are left in the
//! text verbatim, which is what a browser does too.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Maps entity names (without the leading '&') to their replacement strings.
///
/// Entries without a trailing semicolon are the legacy forms that browsers
/// still accept (`&amp` in `?a=1&amp=2`).
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp;", "&"),
        ("amp", "&"),
        ("AMP;", "&"),
        ("lt;", "<"),
        ("lt", "<"),
        ("LT;", "<"),
        ("gt;", ">"),
        ("gt", ">"),
        ("GT;", ">"),
        ("quot;", "\""),
        ("quot", "\""),
        ("QUOT;", "\""),
        ("apos;", "'"),
        ("nbsp;", "\u{00A0}"),
        ("nbsp", "\u{00A0}"),
        ("ensp;", "\u{2002}"),
        ("emsp;", "\u{2003}"),
        ("thinsp;", "\u{2009}"),
        ("zwnj;", "\u{200C}"),
        ("zwj;", "\u{200D}"),
        ("shy;", "\u{00AD}"),
        ("copy;", "\u{00A9}"),
        ("copy", "\u{00A9}"),
        ("reg;", "\u{00AE}"),
        ("reg", "\u{00AE}"),
        ("trade;", "\u{2122}"),
        ("mdash;", "\u{2014}"),
        ("ndash;", "\u{2013}"),
        ("hellip;", "\u{2026}"),
        ("bull;", "\u{2022}"),
        ("middot;", "\u{00B7}"),
        ("sect;", "\u{00A7}"),
        ("para;", "\u{00B6}"),
        ("dagger;", "\u{2020}"),
        ("Dagger;", "\u{2021}"),
        ("lsquo;", "\u{2018}"),
        ("rsquo;", "\u{2019}"),
        ("sbquo;", "\u{201A}"),
        ("ldquo;", "\u{201C}"),
        ("rdquo;", "\u{201D}"),
        ("bdquo;", "\u{201E}"),
        ("laquo;", "\u{00AB}"),
        ("raquo;", "\u{00BB}"),
        ("lsaquo;", "\u{2039}"),
        ("rsaquo;", "\u{203A}"),
        ("iexcl;", "\u{00A1}"),
        ("iquest;", "\u{00BF}"),
        ("cent;", "\u{00A2}"),
        ("pound;", "\u{00A3}"),
        ("euro;", "\u{20AC}"),
        ("yen;", "\u{00A5}"),
        ("curren;", "\u{00A4}"),
        ("times;", "\u{00D7}"),
        ("divide;", "\u{00F7}"),
        ("plusmn;", "\u{00B1}"),
        ("minus;", "\u{2212}"),
        ("ne;", "\u{2260}"),
        ("le;", "\u{2264}"),
        ("ge;", "\u{2265}"),
        ("asymp;", "\u{2248}"),
        ("infin;", "\u{221E}"),
        ("deg;", "\u{00B0}"),
        ("micro;", "\u{00B5}"),
        ("frac12;", "\u{00BD}"),
        ("frac14;", "\u{00BC}"),
        ("frac34;", "\u{00BE}"),
        ("sup2;", "\u{00B2}"),
        ("sup3;", "\u{00B3}"),
        ("larr;", "\u{2190}"),
        ("rarr;", "\u{2192}"),
        ("uarr;", "\u{2191}"),
        ("darr;", "\u{2193}"),
        ("harr;", "\u{2194}"),
        ("check;", "\u{2713}"),
        ("star;", "\u{2606}"),
        ("hearts;", "\u{2665}"),
        ("alpha;", "\u{03B1}"),
        ("beta;", "\u{03B2}"),
        ("gamma;", "\u{03B3}"),
        ("delta;", "\u{03B4}"),
        ("epsilon;", "\u{03B5}"),
        ("lambda;", "\u{03BB}"),
        ("mu;", "\u{03BC}"),
        ("pi;", "\u{03C0}"),
        ("sigma;", "\u{03C3}"),
        ("omega;", "\u{03C9}"),
        ("Omega;", "\u{03A9}"),
        ("aacute;", "\u{00E1}"),
        ("agrave;", "\u{00E0}"),
        ("acirc;", "\u{00E2}"),
        ("auml;", "\u{00E4}"),
        ("aring;", "\u{00E5}"),
        ("aelig;", "\u{00E6}"),
        ("ccedil;", "\u{00E7}"),
        ("eacute;", "\u{00E9}"),
        ("egrave;", "\u{00E8}"),
        ("ecirc;", "\u{00EA}"),
        ("euml;", "\u{00EB}"),
        ("iacute;", "\u{00ED}"),
        ("iuml;", "\u{00EF}"),
        ("ntilde;", "\u{00F1}"),
        ("oacute;", "\u{00F3}"),
        ("ocirc;", "\u{00F4}"),
        ("ouml;", "\u{00F6}"),
        ("oslash;", "\u{00F8}"),
        ("szlig;", "\u{00DF}"),
        ("uacute;", "\u{00FA}"),
        ("uuml;", "\u{00FC}"),
        ("Aacute;", "\u{00C1}"),
        ("Auml;", "\u{00C4}"),
        ("Aring;", "\u{00C5}"),
        ("Ccedil;", "\u{00C7}"),
        ("Eacute;", "\u{00C9}"),
        ("Ntilde;", "\u{00D1}"),
        ("Ouml;", "\u{00D6}"),
        ("Oslash;", "\u{00D8}"),
        ("Uuml;", "\u{00DC}"),
    ])
});

/// Look up a named character reference.
///
/// The `name` should NOT include the leading '&'.
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// Length in bytes of the longest entity name that `candidate` starts with.
///
/// `candidate` is the text after `&`. Used to find the longest match, e.g.
/// `&notit;` matches nothing here but `&ampfoo` matches the legacy `amp`.
#[must_use]
pub fn longest_entity_prefix(candidate: &str) -> Option<(usize, &'static str)> {
    let mut end = candidate
        .char_indices()
        .find(|&(_, c)| !c.is_ascii_alphanumeric())
        .map_or(candidate.len(), |(i, _)| i);
    if candidate[end..].starts_with(';') {
        end += 1;
    }
    (1..=end)
        .rev()
        .find_map(|len| lookup_entity(&candidate[..len]).map(|text| (len, text)))
}
