use std::collections::HashMap;

pub fn builtin_characters() -> HashMap<&'static str, &'static str> {
    HashMap::from([(
        "pregen_hero",
        include_str!("../content/characters/pregen_hero.json"),
    )])
}
