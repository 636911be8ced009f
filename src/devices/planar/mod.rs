// SPDX-License-Identifier: GPL-3.0-only
//! Planar display device specifications

pub mod ultrares;
