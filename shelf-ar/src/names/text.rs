//! Text folding, fragment cleaning and surname stems

/// Case-, ё- and diacritic-insensitive comparison key
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect()
}

/// Base letter of a lowercase Latin-1 or Latin Extended-A letter; `ё` → `е`
///
/// Other characters, including other scripts, pass through unchanged.
fn strip_diacritic(c: char) -> char {
    match c {
        'ё' => 'е',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => 's',
        'ţ' | 'ť' | 'ŧ' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}

/// Replace ё/Ё with е/Е, keeping case
pub fn unify_yo(text: &str) -> String {
    text.replace('ё', "е").replace('Ё', "Е")
}

/// Gender/number-insensitive stem of a surname
///
/// "Каменский", "Каменская" and "Каменские" share the stem "каменск";
/// "Петров", "Петрова" and "Петровы" share "петров".
pub fn surname_stem(word: &str) -> String {
    let folded = fold(word.trim_matches(|c: char| !c.is_alphabetic()));

    for base in ["ск", "цк"] {
        for tail in ["ая", "ий", "ое", "ие", "их", "ой"] {
            if let Some(stem) = folded.strip_suffix(&format!("{base}{tail}")) {
                if stem.chars().count() >= 2 {
                    return format!("{stem}{base}");
                }
            }
        }
    }

    for base in ["ов", "ев", "ин", "ын"] {
        for tail in ["ы", "а", "ой", "ых"] {
            if let Some(stem) = folded.strip_suffix(&format!("{base}{tail}")) {
                if stem.chars().count() >= 2 {
                    return format!("{stem}{base}");
                }
            }
        }
    }

    for tail in ["ая", "ой", "ий", "ый", "ые", "ие"] {
        if let Some(stem) = folded.strip_suffix(tail) {
            if stem.chars().count() >= 3 {
                return stem.to_string();
            }
        }
    }

    folded
}

/// Singular form of a plural family surname ("Живовы" → "Живов")
pub fn singularize_family(word: &str) -> String {
    for (plural, singular) in [("ские", "ский"), ("цкие", "цкий")] {
        if let Some(stem) = word.strip_suffix(plural) {
            return format!("{stem}{singular}");
        }
    }
    for plural in ["овы", "евы", "ины", "ыны"] {
        if word.ends_with(plural) {
            let mut singular = word.to_string();
            singular.pop();
            return singular;
        }
    }
    word.to_string()
}

/// Russian patronymic ("Сергеевич", "Ивановна", "Ильинична")
pub fn is_patronymic(word: &str) -> bool {
    let folded = fold(word);
    folded.chars().count() > 5
        && ["ович", "евич", "овна", "евна", "ична"]
            .iter()
            .any(|ending| folded.ends_with(ending))
}

/// Initials token ("И.", "А.Я.", "Yu.")
pub fn is_initials(token: &str) -> bool {
    if !token.ends_with('.') {
        return false;
    }
    let pieces: Vec<&str> = token.split('.').filter(|p| !p.is_empty()).collect();
    !pieces.is_empty()
        && pieces.iter().all(|p| {
            let count = p.chars().count();
            (1..=2).contains(&count)
                && p.chars().all(char::is_alphabetic)
                && p.chars().next().is_some_and(char::is_uppercase)
        })
}

/// Ending typical of an East Slavic surname
pub fn has_surname_ending(word: &str) -> bool {
    const ENDINGS: &[&str] = &[
        "ов", "ев", "ин", "ын", "ова", "ева", "ина", "ына", "ский", "цкий", "ская", "цкая",
        "их", "ых", "енко", "ко", "ук", "юк", "ич",
    ];
    let folded = fold(word);
    folded.chars().count() > 3 && ENDINGS.iter().any(|e| folded.ends_with(e))
}

/// Share of vowels among the word's letters
pub fn vowel_ratio(word: &str) -> f64 {
    const VOWELS: &str = "аеёиоуыэюяaeiouy";
    let folded = fold(word);
    let letters = folded.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return 0.0;
    }
    let vowels = folded.chars().filter(|c| VOWELS.contains(*c)).count();
    vowels as f64 / letters as f64
}

/// Clean a captured author substring
///
/// Strips quotation marks and bracketed content, collapses whitespace and
/// trims trailing punctuation. A trailing dot that closes an initial is kept.
pub fn clean_fragment(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '"' | '«' | '»' | '„' | '“' | '”' | '\'' => {}
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }

    let collapsed = collapse_whitespace(&stripped);
    let trimmed = collapsed.trim_end_matches([',', ';', ':', '-', '–', '—', ' ']);
    let ends_with_initial = trimmed
        .split_whitespace()
        .last()
        .is_some_and(is_initials);
    if ends_with_initial {
        trimmed.to_string()
    } else {
        trimmed.trim_end_matches(['.', ',', ';', ':', ' ']).to_string()
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split an author field into names on ';' and ','
pub fn split_names(field: &str) -> Vec<String> {
    field
        .split([';', ','])
        .map(collapse_whitespace)
        .filter(|name| !name.is_empty())
        .collect()
}
