use crate::common::{analyze_default, bundle, glibc_program};
use pkgsca::MemFs;

#[test]
fn test_shebang_interpreters() {
    let fs = MemFs::new()
        .with_executable("usr/bin/a-bash", b"#!/bin/bash\nexec true\n".to_vec())
        .with_executable(
            "usr/bin/b-env-split",
            b"#!/usr/bin/env -S envDashSCmd -x -y\n".to_vec(),
        )
        .with_executable("usr/bin/c-python", b"#!/usr/bin/python3.12\nimport sys\n".to_vec())
        .with_executable("usr/bin/d-env", b"#!/usr/bin/env -i PATH=/bin python3\n".to_vec())
        .with_executable("usr/bin/e-binary", glibc_program(&[]));
    let deps = analyze_default(&bundle("shbang-test", "1-r0", fs));

    assert_eq!(
        deps.runtime,
        vec![
            "so:libc.so.6",
            "so:ld-linux-aarch64.so.1",
            "cmd:bash",
            "cmd:envDashSCmd",
            "cmd:python3.12",
            "cmd:python3",
        ]
    );
    assert_eq!(
        deps.provides,
        vec!["cmd:e-binary=1-r0"]
    );
}

#[test]
fn test_non_executable_scripts_outside_bin_are_ignored() {
    let fs = MemFs::new()
        .with_file("usr/share/examples/demo.py", b"#!/usr/bin/python3\n".to_vec())
        .with_executable("usr/libexec/tool/hook", b"#!/bin/sh\n".to_vec());
    let deps = analyze_default(&bundle("tool", "1-r0", fs));

    assert_eq!(deps.runtime, vec!["cmd:sh"]);
}
