use crate::error::{Result, ScanwiseError};
use crate::preset::{BUILTIN_PRESET_IDS, PartialPreset, Preset, base_preset, builtin_override, merge_preset};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Loader for presets: built-ins plus JSON override files on disk.
///
/// A preset `<id>` is assembled by folding, in order, the base preset, the
/// built-in override for `<id>` (if any), `<standard_dir>/<id>.json` and
/// `<custom_dir>/<id>.json`. Later layers win for scalars; lists append.
#[derive(Debug, Clone)]
pub struct PresetLoader {
    /// User preset directory, highest priority
    custom_dir: Option<PathBuf>,
    /// Bundled preset directory
    standard_dir: Option<PathBuf>,
    /// Merged presets by id
    cache: HashMap<String, Preset>,
}

impl PresetLoader {
    /// Create a loader that only knows the built-in presets
    pub fn new() -> Self {
        Self { custom_dir: None, standard_dir: None, cache: HashMap::new() }
    }

    /// Load and merge the preset with this id
    pub fn load(&mut self, id: &str) -> Result<Preset> {
        if let Some(preset) = self.cache.get(id) {
            return Ok(preset.clone());
        }

        let mut preset = base_preset();
        let mut found = id == preset.id;

        if let Some(overlay) = builtin_override(id) {
            preset = merge_preset(&preset, &overlay);
            found = true;
        }

        for file_path in self.find_preset_files(id).iter().rev() {
            match Self::parse_file(file_path) {
                Ok(mut overlay) => {
                    overlay.id.get_or_insert_with(|| id.to_string());
                    preset = merge_preset(&preset, &overlay);
                    found = true;
                }
                Err(e) => tracing::warn!(path = %file_path.display(), error = %e, "skipping preset file"),
            }
        }

        if !found {
            return Err(ScanwiseError::UnknownPreset(id.to_string()));
        }

        tracing::debug!(preset = %preset.id, "loaded preset");
        self.cache.insert(id.to_string(), preset.clone());
        Ok(preset)
    }

    /// Load the preset whose domain rules match the URL's host.
    ///
    /// The longest matching rule wins; hosts no preset claims get the base preset.
    pub fn load_for_url(&mut self, url: &str) -> Result<Preset> {
        let host = extract_domain(url)?;
        self.load_for_host(&host)
    }

    /// Same as [`PresetLoader::load_for_url`] for a bare hostname
    pub fn load_for_host(&mut self, host: &str) -> Result<Preset> {
        let host = host.trim_end_matches('.').to_lowercase();
        let mut best: Option<(usize, Preset)> = None;

        for id in self.available_ids() {
            let preset = match self.load(&id) {
                Ok(preset) => preset,
                Err(e) => {
                    tracing::warn!(preset = %id, error = %e, "skipping preset");
                    continue;
                }
            };

            let specificity = preset
                .domain_rules
                .iter()
                .filter(|rule| host_matches(&host, rule))
                .map(|rule| rule.trim_start_matches('.').len())
                .max();

            if let Some(len) = specificity
                && best.as_ref().is_none_or(|(current, _)| len > *current)
            {
                best = Some((len, preset));
            }
        }

        match best {
            Some((_, preset)) => Ok(preset),
            None => self.load(BUILTIN_PRESET_IDS[0]),
        }
    }

    /// Ids of every preset this loader can resolve, sorted
    pub fn available_ids(&self) -> Vec<String> {
        let mut ids: BTreeSet<String> = BUILTIN_PRESET_IDS.iter().map(|id| id.to_string()).collect();

        for dir in [&self.custom_dir, &self.standard_dir].into_iter().flatten() {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for path in entries.flatten().map(|entry| entry.path()) {
                if path.extension().is_some_and(|ext| ext == "json")
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                {
                    ids.insert(stem.to_string());
                }
            }
        }

        ids.into_iter().collect()
    }

    /// Preset files for an id in priority order (custom first)
    fn find_preset_files(&self, id: &str) -> Vec<PathBuf> {
        let file_name = format!("{}.json", id);
        let mut files = Vec::new();

        for dir in [&self.custom_dir, &self.standard_dir].into_iter().flatten() {
            let file_path = dir.join(&file_name);
            if file_path.is_file() && !files.contains(&file_path) {
                files.push(file_path);
            }
        }

        files
    }

    fn parse_file(path: &Path) -> Result<PartialPreset> {
        let json = fs::read_to_string(path)?;
        PartialPreset::from_json(&json).map_err(|source| ScanwiseError::PresetParse { path: path.to_path_buf(), source })
    }

    /// Clear the preset cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Load and cache a list of presets up front
    pub fn preload(&mut self, ids: &[&str]) -> Result<()> {
        for id in ids {
            self.load(id)?;
        }
        Ok(())
    }
}

/// Extract the host from a URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url).map_err(|e| ScanwiseError::InvalidUrl(e.to_string()))?;

    let domain = url
        .host_str()
        .ok_or_else(|| ScanwiseError::InvalidUrl("No domain found in URL".to_string()))?;

    Ok(domain.to_lowercase())
}

/// `host` equals `rule` or is a subdomain of it
fn host_matches(host: &str, rule: &str) -> bool {
    let rule = rule.trim().trim_start_matches('.').to_lowercase();
    if rule.is_empty() {
        return false;
    }
    host == rule || host.strip_suffix(&rule).is_some_and(|prefix| prefix.ends_with('.'))
}

/// Builder for PresetLoader
#[derive(Debug)]
pub struct PresetLoaderBuilder {
    custom_dir: Option<PathBuf>,
    standard_dir: Option<PathBuf>,
}

impl PresetLoaderBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { custom_dir: None, standard_dir: None }
    }

    /// Set custom preset directory
    pub fn custom_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.custom_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set standard preset directory
    pub fn standard_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.standard_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the PresetLoader
    pub fn build(self) -> PresetLoader {
        PresetLoader { custom_dir: self.custom_dir, standard_dir: self.standard_dir, cache: HashMap::new() }
    }
}

impl Default for PresetLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for PresetLoader {
    fn default() -> Self {
        let mut builder = PresetLoaderBuilder::new();

        if let Some(custom_dir) = Self::default_custom_dir() {
            builder = builder.custom_dir(custom_dir);
        }

        if let Some(standard_dir) = Self::default_standard_dir() {
            builder = builder.standard_dir(standard_dir);
        }

        builder.build()
    }
}

impl PresetLoader {
    /// Default custom preset directory (`<config dir>/scanwise/presets`)
    pub fn default_custom_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scanwise").join("presets"))
    }

    /// Default standard preset directory (`presets/` next to the working directory)
    fn default_standard_dir() -> Option<PathBuf> {
        let std_dir = PathBuf::from("presets");
        if std_dir.is_dir() { Some(std_dir) } else { None }
    }
}
