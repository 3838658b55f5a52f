#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    pub tmp: TempDir,
    pub bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&bin).expect("create fake tool dir");
        Self { tmp, bin }
    }

    /// Installs an executable shell script standing in for an external tool.
    pub fn write_tool(&self, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = self.bin.join(name);
        fs::write(&path, script).expect("write fake tool");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("mark fake tool executable");
        path
    }

    pub fn cmd(&self) -> Command {
        Command::cargo_bin("buildcheck").expect("buildcheck binary")
    }
}

/// Source tree fixture for the header pipeline: a built out dir, three real
/// headers, a dependency trace, and a build-graph description.
pub struct HeaderTree {
    pub root: PathBuf,
    pub ninja: PathBuf,
    pub gn: PathBuf,
    pub gclient: PathBuf,
}

pub fn make_header_tree(env: &TestEnv) -> HeaderTree {
    let root = env.tmp.path().join("src");
    fs::create_dir_all(root.join("out/Release")).expect("create out dir");
    fs::write(root.join("out/Release/args.gn"), "is_debug = false\n").expect("write args.gn");
    for header in ["base/a.h", "base/missing.h", "x/y.h"] {
        let path = root.join(header);
        fs::create_dir_all(path.parent().expect("header parent")).expect("create header dir");
        fs::write(path, "#pragma once\n").expect("write header");
    }

    let trace = "\
obj/base/a.o: #deps 4, deps mtime 1234 (VALID)
    ../../base/a.h
    ../../base/missing.h
    ../../build/build_config.h
    ../../out/Release/gen/settings.h
obj/x/y.o: #deps 1, deps mtime 12 (VALID)
    ../../x/y.h
obj/stale.o: #deps 1, deps mtime 1 (STALE)
    ../../base/stale.h
";
    fs::write(root.join("deps.txt"), trace).expect("write deps fixture");

    let project = serde_json::json!({
        "targets": {
            "//base:base": {
                "sources": ["//base/a.h", "//base/a.cc"],
                "public": "*"
            },
            "//base:api": {
                "public": ["//base/gone.h"]
            }
        }
    });
    fs::write(
        root.join("project.json"),
        serde_json::to_string_pretty(&project).expect("serialize project"),
    )
    .expect("write project fixture");

    let ninja = env.write_tool(
        "ninja",
        &format!(
            "#!/bin/sh\n\
             if [ \"$3\" = \"-t\" ]; then\n\
               cat \"{}\"\n\
             else\n\
               echo \"ninja: Entering directory\"\n\
               echo \"no work to do.\"\n\
             fi\n",
            root.join("deps.txt").display()
        ),
    );
    let gn = env.write_tool(
        "gn",
        &format!(
            "#!/bin/sh\ncp \"{}\" \"$2/project.json\"\n",
            root.join("project.json").display()
        ),
    );
    let gclient = env.write_tool(
        "gclient",
        "#!/bin/sh\necho \"src/x/\"\necho \"Progress: done\"\n",
    );

    HeaderTree {
        root,
        ninja,
        gn,
        gclient,
    }
}

impl HeaderTree {
    pub fn args<'a>(&'a self, extra: &[&'a str]) -> Vec<String> {
        let mut args = vec![
            "headers".to_string(),
            "--src-root".to_string(),
            self.root.display().to_string(),
            "--ninja".to_string(),
            self.ninja.display().to_string(),
            "--gn".to_string(),
            self.gn.display().to_string(),
            "--gclient".to_string(),
            self.gclient.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }
}

/// Package fixture for the size pipeline: three archives sharing one blob
/// (raw compressed size 24576 after block rounding) plus one unique blob
/// each (8192 after rounding), so every apportioned size is 16384.
pub struct SizeTree {
    pub build_out: PathBuf,
    pub sizes_path: PathBuf,
    pub far: PathBuf,
    pub compressor: PathBuf,
}

pub fn make_size_tree(env: &TestEnv, limits: Value) -> SizeTree {
    let build_out = env.tmp.path().join("out");
    let farfix = env.tmp.path().join("farfix");
    fs::create_dir_all(&build_out).expect("create build out");

    for (package, unique_hash) in [
        ("chrome", "chromehash"),
        ("shell", "shellhash"),
        ("helper", "helperhash"),
    ] {
        fs::write(build_out.join(format!("{package}.far")), "archive").expect("write far");

        let extract = farfix.join(package);
        fs::create_dir_all(&extract).expect("create extract fixture");
        fs::write(extract.join("meta.far"), "meta archive").expect("write meta.far");
        fs::write(extract.join(unique_hash), vec![b'u'; 100]).expect("write unique blob");
        fs::write(extract.join("sharedhash"), vec![b's'; 20000]).expect("write shared blob");
        fs::write(extract.join("icuhash"), vec![b'i'; 50000]).expect("write excluded blob");

        let meta = farfix.join(format!("{package}_meta")).join("meta");
        fs::create_dir_all(&meta).expect("create meta fixture");
        fs::write(
            meta.join("contents"),
            format!("bin/{package}={unique_hash}\nlib/shared=sharedhash\nicudtl.dat=icuhash\n"),
        )
        .expect("write contents");
    }

    let far = env.write_tool(
        "far",
        &format!(
            "#!/bin/sh\n\
             archive=\"\"; out=\"\"\n\
             for a in \"$@\"; do\n\
               case \"$a\" in\n\
                 --archive=*) archive=\"${{a#--archive=}}\" ;;\n\
                 --output=*) out=\"${{a#--output=}}\" ;;\n\
               esac\n\
             done\n\
             name=$(basename \"$archive\")\n\
             if [ \"$name\" = \"meta.far\" ]; then\n\
               key=\"$(basename \"$(dirname \"$archive\")\")_meta\"\n\
             else\n\
               key=\"${{name%.far}}\"\n\
             fi\n\
             mkdir -p \"$out\"\n\
             cp -r \"{}/$key/.\" \"$out/\"\n",
            farfix.display()
        ),
    );
    let compressor = env.write_tool(
        "blobfs-compression",
        "#!/bin/sh\n\
         src=\"\"; dst=\"\"\n\
         for a in \"$@\"; do\n\
           case \"$a\" in\n\
             --source_file=*) src=\"${a#--source_file=}\" ;;\n\
             --compressed_file=*) dst=\"${a#--compressed_file=}\" ;;\n\
           esac\n\
         done\n\
         cp \"$src\" \"$dst\"\n\
         echo \"Wrote $(stat -c %s \"$src\") bytes (40% compression)\"\n",
    );

    let config = serde_json::json!({
        "far_files": ["chrome.far", "shell.far", "helper.far"],
        "size_limits": limits,
        "far_total_name": "total"
    });
    let sizes_path = env.tmp.path().join("size_budgets.json");
    fs::write(
        &sizes_path,
        serde_json::to_string_pretty(&config).expect("serialize budgets"),
    )
    .expect("write budgets");

    SizeTree {
        build_out,
        sizes_path,
        far,
        compressor,
    }
}

impl SizeTree {
    pub fn args<'a>(&'a self, extra: &[&'a str]) -> Vec<String> {
        let mut args = vec![
            "sizes".to_string(),
            "--build-out-dir".to_string(),
            self.build_out.display().to_string(),
            "--sizes-path".to_string(),
            self.sizes_path.display().to_string(),
            "--far-tool".to_string(),
            self.far.display().to_string(),
            "--compressor".to_string(),
            self.compressor.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }
}

pub fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("read json file");
    serde_json::from_str(&raw).expect("valid json file")
}
