//! Print the JSON Schema of the derbyJSON game record to stdout.

fn main() {
    let schema = schemars::schema_for!(derby_json::GameRecord);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
