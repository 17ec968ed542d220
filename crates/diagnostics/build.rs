//! Build script that compiles the SCPI error-code table.
//!
//! Reads `spec/errors.jsonc` and generates, in `OUT_DIR`:
//! - `generated_codes.rs`: one `pub const NAME: i16` per code
//! - `generated_translate.rs`: a match expression mapping code → message
//! - `generated_table.rs`: the ordered `[ErrorCode]` table

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use scpi_engine_jsonc_strip::strip_jsonc;

const HEADER: &str = "// Auto-generated from spec/errors.jsonc. DO NOT EDIT.\n\n";

struct Entry {
    code: i16,
    name: String,
    message: String,
}

fn main() {
    let spec_path = Path::new("spec/errors.jsonc");
    println!("cargo:rerun-if-changed={}", spec_path.display());

    let raw = fs::read_to_string(spec_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", spec_path.display()));
    let spec: serde_json::Value = serde_json::from_str(&strip_jsonc(&raw))
        .unwrap_or_else(|e| panic!("failed to parse {} as JSON: {e}", spec_path.display()));
    let rows = spec["errors"]
        .as_array()
        .expect("errors.jsonc: expected `errors` array");

    let entries = load_entries(rows);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let out_path = Path::new(&out_dir);

    // ── generated_codes.rs ──────────────────────────────────────────────
    let mut codes = String::from(HEADER);
    for e in &entries {
        codes.push_str(&format!("/// `{}`: {}\n", e.code, e.message));
        codes.push_str(&format!("pub const {}: i16 = {};\n\n", e.name, e.code));
    }
    fs::write(out_path.join("generated_codes.rs"), &codes)
        .expect("failed to write generated_codes.rs");

    // ── generated_translate.rs ──────────────────────────────────────────
    let mut translate = String::from("match code {\n");
    for e in &entries {
        translate.push_str(&format!(
            "    {} => Some(\"{}\"),\n",
            e.code,
            escape_rust_string_literal(&e.message)
        ));
    }
    translate.push_str("    _ => None,\n}\n");
    fs::write(out_path.join("generated_translate.rs"), &translate)
        .expect("failed to write generated_translate.rs");

    // ── generated_table.rs ──────────────────────────────────────────────
    let mut table = format!("{HEADER}[\n");
    for e in &entries {
        table.push_str(&format!(
            "    ErrorCode {{ code: {}, name: \"{}\", message: \"{}\" }},\n",
            e.code,
            e.name,
            escape_rust_string_literal(&e.message)
        ));
    }
    table.push_str("]\n");
    fs::write(out_path.join("generated_table.rs"), &table)
        .expect("failed to write generated_table.rs");
}

fn load_entries(rows: &[serde_json::Value]) -> Vec<Entry> {
    let mut seen_codes: HashSet<i16> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let code = row["code"]
            .as_i64()
            .unwrap_or_else(|| panic!("errors[{i}] missing integer `code`"));
        let code = i16::try_from(code)
            .unwrap_or_else(|_| panic!("errors[{i}]: code {code} does not fit in i16"));
        let name = row["constName"]
            .as_str()
            .unwrap_or_else(|| panic!("errors[{i}] (code={code}) missing `constName`"));
        let message = row["message"]
            .as_str()
            .unwrap_or_else(|| panic!("errors[{i}] (code={code}) missing `message`"));

        assert!(
            !name.is_empty()
                && name
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
                && name.as_bytes()[0].is_ascii_uppercase(),
            "errors[{i}] (code={code}): constName '{name}' is not SCREAMING_SNAKE_CASE"
        );
        assert!(
            seen_codes.insert(code),
            "errors[{i}]: duplicate code {code}"
        );
        assert!(
            seen_names.insert(name.to_string()),
            "errors[{i}] (code={code}): duplicate constName '{name}'"
        );
        assert!(
            message.len() <= 255,
            "errors[{i}] (code={code}): message longer than 255 bytes"
        );

        entries.push(Entry {
            code,
            name: name.to_string(),
            message: message.to_string(),
        });
    }
    entries
}

fn escape_rust_string_literal(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}
