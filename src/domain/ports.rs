/// Package layout and naming the conversion works with.
///
/// Every path is relative to the package root passed to the converter.
pub trait ConfigProvider {
    fn descriptor_file(&self) -> &str;
    fn tests_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn archive_name(&self) -> &str;
    fn score_file(&self) -> &str;
    fn polygon_input_template(&self) -> &str;
    fn polygon_output_template(&self) -> &str;
    fn cms_input_template(&self) -> &str;
    fn cms_output_template(&self) -> &str;
    /// Points for a group whose descriptor entry has none.
    fn default_points(&self) -> u64;
    /// Name of the testset to convert; `None` picks the first one declaring groups.
    fn testset(&self) -> Option<&str>;
}
