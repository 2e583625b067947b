/// Derives the product line from the origin/destination pair. Destination
/// is checked first: a lane that is India-bound on both ends classifies as
/// an import.
pub fn choose_product_line(origin_code: Option<&str>, dest_code: Option<&str>) -> Option<String> {
    if dest_code.is_some_and(|code| code.to_uppercase().starts_with("IN")) {
        return Some("pl_sea_import_lcl".to_string());
    }
    if origin_code.is_some_and(|code| code.to_uppercase().starts_with("IN")) {
        return Some("pl_sea_export_lcl".to_string());
    }
    None
}
