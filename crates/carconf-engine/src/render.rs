//! Render query strings and export file names.

use indexmap::IndexSet;

use carconf_model::{ActivationTree, Camera, Category, OptionsState};

/// Codes sent to the renderer: the selection, the attach codes and the
/// standard parts, each block comma-joined and the blocks joined by `,`.
///
/// Attach entries may hold several `&`-joined codes; they are split and
/// de-duplicated. Empty blocks are kept, so the result can contain `,,`.
pub fn code_list(options: &OptionsState, tree: &ActivationTree, standard_parts: &[String]) -> String {
    let selected = options.selected_codes().join(",");
    let attach_joined = tree.attach_codes().join("&");
    let attach: IndexSet<&str> = attach_joined.split('&').collect();
    let attach = attach.into_iter().collect::<Vec<_>>().join(",");
    format!("{selected},{attach},{}", standard_parts.join(","))
}

/// Query fragment for one image: `codes,camera` followed by the settings
/// string, with the first `,,` collapsed.
pub fn image_query(code_list: &str, camera: &Camera, settings: &str) -> String {
    format!("{code_list},{}{settings}", camera.query_fragment()).replacen(",,", ",", 1)
}

/// Export file stem:
/// `market_trim_drivetrain_bodystyle_color_wheels_leather_TYPE_CAMERA`.
pub fn file_stem(options: &OptionsState, camera: &Camera) -> String {
    let parts = [
        Category::Market,
        Category::Trim,
        Category::Drivetrain,
        Category::BodyStyle,
        Category::Color,
        Category::Wheels,
        Category::Leather,
    ]
    .map(|category| options.get(category));
    format!(
        "{}_{}_{}",
        parts.join("_"),
        camera.kind.as_str(),
        camera.code
    )
}
