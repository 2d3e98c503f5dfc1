//! Manifest fixtures shared by unit tests.

use std::path::Path;

/// A `.gclient` solutions file naming `DEPS`.
pub const GCLIENT_FILE_TEXT: &str = r#"solutions = [
  {
    "name": "src",
    "url": "https://chromium.googlesource.com/chromium/src.git",
    "deps_file": "DEPS",
    "managed": False,
    "custom_deps": {},
  },
]
target_os = ["linux"]
"#;

/// A DEPS file exercising every value form the extractor understands.
pub const DEPS_FILE_TEXT: &str = r#"# Pinned third party code for the test checkout.
use_relative_paths = False

vars = {
  'chromium_git': 'https://chromium.googlesource.com',
  'github_mirror': Var('chromium_git') + '/external/github.com',
  'zlib_revision': '0123456789abcdef',
  'abseil_revision': '7f3a0c1d',
  # Build toggles are not locations.
  'checkout_nacl': True,
}

deps = {
  'src/third_party/zlib':
    Var('chromium_git') + '/chromium/src/third_party/zlib.git' + '@' + Var('zlib_revision'),

  'src/third_party/abseil': {
    'url': '{github_mirror}/abseil/abseil-cpp.git@{abseil_revision}',
    'condition': 'checkout_linux',
  },

  'src/third_party/nested/lib': {
    'url': Var('chromium_git') + '/nested/lib.git' + '@' + 'feedface',
  },

  'src/tools/gn': 'https://gn.googlesource.com/gn.git@cafe',  # pinned by the roller

  'src/third_party/cipd_tools': {
    'packages': [
      {
        'package': 'infra/tools/luci/isolate',
        'version': 'git_revision:abc',
      },
    ],
    'dep_type': 'cipd',
  },

  'src/third_party/placeholder': None,
}

recursedeps = [
  'src/tools/gn',
]
"#;

/// Write `.gclient` and `DEPS` into `root`.
pub fn write_checkout(root: &Path) -> std::io::Result<()> {
    std::fs::write(root.join(".gclient"), GCLIENT_FILE_TEXT)?;
    std::fs::write(root.join("DEPS"), DEPS_FILE_TEXT)
}
