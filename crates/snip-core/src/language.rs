//! Language identifier normalisation.

/// Alias -> canonical identifier.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("node", "javascript"),
    ("nodejs", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("rs", "rust"),
    ("golang", "go"),
    ("c++", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("c#", "csharp"),
    ("cs", "csharp"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    ("rb", "ruby"),
    ("kt", "kotlin"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("objective-c", "objc"),
    ("ps1", "powershell"),
];

/// Canonical identifiers accepted as-is (after lowercasing).
const CANONICAL_LANGUAGES: &[&str] = &[
    "bash", "c", "cpp", "csharp", "css", "dart", "elixir", "erlang", "go", "haskell", "html",
    "java", "javascript", "json", "kotlin", "lua", "markdown", "nix", "objc", "ocaml", "perl",
    "php", "powershell", "python", "r", "ruby", "rust", "scala", "solidity", "sql", "swift",
    "toml", "typescript", "yaml", "zig",
];

/// File extension -> canonical identifier.
const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("swift", "swift"),
    ("rb", "ruby"),
    ("php", "php"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "bash"),
    ("sql", "sql"),
    ("html", "html"),
    ("css", "css"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("md", "markdown"),
    ("lua", "lua"),
    ("zig", "zig"),
    ("nix", "nix"),
    ("sol", "solidity"),
    ("dart", "dart"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("hs", "haskell"),
    ("ml", "ocaml"),
    ("scala", "scala"),
    ("pl", "perl"),
    ("ps1", "powershell"),
];

/// Map a user-supplied language to its canonical lowercase identifier.
///
/// Unknown input is returned unchanged; relays tolerate unrecognised values,
/// so failing here would only hide results.
pub fn normalize_language(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    if let Some((_, canonical)) = LANGUAGE_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return (*canonical).to_string();
    }
    if CANONICAL_LANGUAGES.contains(&lowered.as_str()) {
        return lowered;
    }
    input.to_string()
}

/// Guess the language from a file extension (with or without the dot).
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    let ext = extension.trim().trim_start_matches('.').to_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}
