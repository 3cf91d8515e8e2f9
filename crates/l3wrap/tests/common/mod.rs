#![allow(dead_code)]

use l3wrap_lib::Table;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Writes `<stem>.cls`, `<stem>.diz` and both rule levels into the current
/// directory, like the real training binary.
const FAKE_TRAIN: &str = r#"#!/bin/sh
stem="$1"
echo "$@" > train_args.txt
printf '0\nno\nyes\n' > "$stem.cls"
printf '1->1,sunny\n2->1,rainy\n3->2,true\n4->2,false\n' > "$stem.diz"
printf '{1,3} 0 0 12 0.9\n{2} 0 1 8 0.8\n{4} 0 1 7 0.75\n{1} 0 0 5 0.6\n' > livelloI.txt
printf '{3} 0 0 3 0.5\n{} 0 1 2 0.4\n' > livelloII.txt
"#;

/// Labels every row of `<stem>.data` with its first field.
const FAKE_CLASSIFY: &str = r#"#!/bin/sh
stem="$1"
{
  echo "L3 classification"
  echo "row rule label"
  awk -F, '{ print NR, 0, $1 }' "$stem.data"
} > classificati.txt
"#;

pub const TRAIN_BIN: &str = "L3CFiltriItemTrain";
pub const CLASSIFY_BIN: &str = "L3CFiltriItemClassifica";

/// Expected rule counts of the fake training binary.
pub const LEVEL1_RULES: usize = 4;
pub const LEVEL2_RULES: usize = 2;

pub const WEATHER_CSV: &str = "\
outlook,windy,play
sunny,true,no
sunny,false,no
rainy,true,no
rainy,false,yes
sunny,false,yes
";

pub const WEATHER_TEST_CSV: &str = "\
outlook,windy,play
rainy,false,yes
sunny,true,no
";

/// An L3 root whose `bin/` holds every required file, with shell scripts
/// standing in for the two binaries the classifier runs.
///
/// Built once per test binary so no script is still open for writing when
/// another test executes it.
pub fn fake_root() -> &'static Path {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| {
        let root = std::env::temp_dir().join(format!("l3wrap-fake-root-{}", std::process::id()));
        let bin = root.join("bin");
        std::fs::create_dir_all(&bin).unwrap();

        for name in l3wrap_lib::installer::REQUIRED_FILES {
            std::fs::write(bin.join(name), "#!/bin/sh\n").unwrap();
        }
        std::fs::write(bin.join(TRAIN_BIN), FAKE_TRAIN).unwrap();
        std::fs::write(bin.join(CLASSIFY_BIN), FAKE_CLASSIFY).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            for name in l3wrap_lib::installer::REQUIRED_FILES {
                std::fs::set_permissions(bin.join(name), std::fs::Permissions::from_mode(0o755))
                    .unwrap();
            }
        }

        root
    })
}

pub struct TestFixture {
    pub temp_dir: TempDir,
    /// Work directory named after the training stem, so it doubles as the
    /// model directory
    pub work_dir: PathBuf,
}

impl TestFixture {
    pub fn new(stem: &str) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let work_dir = temp_dir.path().join(stem);
        std::fs::create_dir_all(&work_dir).unwrap();
        Self { temp_dir, work_dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).unwrap()
    }

    pub fn lines(&self, name: &str) -> Vec<String> {
        self.read(name).lines().map(str::to_string).collect()
    }
}

pub fn weather_table() -> Table {
    Table::from_csv_str(WEATHER_CSV, "weather").unwrap()
}

pub fn weather_test_table() -> Table {
    Table::from_csv_str(WEATHER_TEST_CSV, "weather").unwrap()
}
