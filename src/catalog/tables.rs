use super::FilterKind::{Contains, DateFrom, DateTo, Equals, Flag, Integer};
use super::{FilterDef, TableDef};

const fn f(param: &'static str, column: &'static str, kind: super::FilterKind) -> FilterDef {
    FilterDef::new(param, column, kind)
}

pub static TABLES: &[TableDef] = &[
    TableDef {
        route: "tgfpro",
        table: "TGFPRO",
        description: "Products",
        primary_key: "TGFPRO.CODPROD",
        columns: &[
            "TGFPRO.CODPROD",
            "TGFPRO.DESCRPROD",
            "TGFPRO.REFERENCIA",
            "TGFPRO.MARCA",
            "TGFPRO.CODGRUPOPROD",
            "TGFGRU.DESCRGRUPOPROD",
            "TGFPRO.CODVOL",
            "TGFPRO.NCM",
            "TGFPRO.LOCALIZACAO",
            "TGFPRO.CODCENCUS",
            "TGFPRO.TIPCONTEST",
            "TGFPRO.LISCONTEST",
            "TGFPRO.ATIVO",
        ],
        joins: &["LEFT JOIN TGFGRU ON TGFPRO.CODGRUPOPROD = TGFGRU.CODGRUPOPROD"],
        filters: &[
            f("codgrupoprod", "TGFPRO.CODGRUPOPROD", Integer),
            f("descrprod", "TGFPRO.DESCRPROD", Contains),
            f("referencia", "TGFPRO.REFERENCIA", Contains),
            f("marca", "TGFPRO.MARCA", Contains),
            f("ativo", "TGFPRO.ATIVO", Flag),
            f("ncm", "TGFPRO.NCM", Contains),
            f("localizacao", "TGFPRO.LOCALIZACAO", Contains),
            f("codcencus", "TGFPRO.CODCENCUS", Integer),
            f("tipcontest", "TGFPRO.TIPCONTEST", Equals),
            f("liscontest", "TGFPRO.LISCONTEST", Equals),
        ],
        default_sort: "TGFPRO.DESCRPROD ASC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tgfgru",
        table: "TGFGRU",
        description: "Product groups",
        primary_key: "CODGRUPOPROD",
        columns: &[
            "CODGRUPOPROD",
            "DESCRGRUPOPROD",
            "CODGRUPAI",
            "GRAU",
            "ANALITICO",
            "ATIVO",
            "CODNAT",
            "CODCENCUS",
            "CODPROJ",
            "SOLCOMPRA",
            "REGRAWMS",
            "APRPRODVDA",
        ],
        joins: &[],
        filters: &[
            f("descrgrupoprod", "DESCRGRUPOPROD", Contains),
            f("codgrupai", "CODGRUPAI", Integer),
            f("analitico", "ANALITICO", Flag),
            f("ativo", "ATIVO", Flag),
            f("codnat", "CODNAT", Integer),
            f("codcencus", "CODCENCUS", Integer),
            f("codproj", "CODPROJ", Integer),
            f("solcompra", "SOLCOMPRA", Flag),
            f("regrawms", "REGRAWMS", Equals),
            f("aprprodvda", "APRPRODVDA", Flag),
        ],
        default_sort: "CODGRUPOPROD DESC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tgfloc",
        table: "TGFLOC",
        description: "Stock locations",
        primary_key: "CODLOCAL",
        columns: &["CODLOCAL", "DESCRLOCAL", "CODLOCALPAI", "ANALITICO", "ATIVO"],
        joins: &[],
        filters: &[
            f("descrlocal", "DESCRLOCAL", Contains),
            f("codlocalpai", "CODLOCALPAI", Integer),
            f("ativo", "ATIVO", Flag),
        ],
        default_sort: "DESCRLOCAL ASC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tgfest",
        table: "TGFEST",
        description: "Stock balances per product and location",
        primary_key: "TGFEST.CODPROD",
        columns: &[
            "TGFEST.CODEMP",
            "TGFEST.CODPROD",
            "TGFPRO.DESCRPROD",
            "TGFEST.CODLOCAL",
            "TGFLOC.DESCRLOCAL",
            "TGFEST.CONTROLE",
            "TGFEST.CODPARC",
            "TGFEST.TIPO",
            "TGFEST.ESTOQUE",
            "TGFEST.RESERVADO",
            "TGFEST.ESTMIN",
            "TGFEST.ESTMAX",
            "TGFEST.ATIVO",
        ],
        joins: &[
            "LEFT JOIN TGFPRO ON TGFEST.CODPROD = TGFPRO.CODPROD",
            "LEFT JOIN TGFLOC ON TGFEST.CODLOCAL = TGFLOC.CODLOCAL",
        ],
        filters: &[
            f("codprod", "TGFEST.CODPROD", Integer),
            f("codlocal", "TGFEST.CODLOCAL", Integer),
            f("codemp", "TGFEST.CODEMP", Integer),
            f("controle", "TGFEST.CONTROLE", Equals),
            f("descrprod", "TGFPRO.DESCRPROD", Contains),
            f("ativo", "TGFEST.ATIVO", Flag),
        ],
        default_sort: "TGFEST.ESTOQUE DESC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tgftop",
        table: "TGFTOP",
        description: "Operation types",
        primary_key: "CODTIPOPER",
        columns: &["CODTIPOPER", "DESCROPER", "TIPMOV", "ATIVO", "DHALTER"],
        joins: &[],
        filters: &[
            f("descroper", "DESCROPER", Contains),
            f("tipmov", "TIPMOV", Equals),
            f("ativo", "ATIVO", Flag),
        ],
        default_sort: "CODTIPOPER DESC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tgfpar",
        table: "TGFPAR",
        description: "Business partners",
        primary_key: "CODPARC",
        columns: &[
            "CODPARC",
            "NOMEPARC",
            "RAZAOSOCIAL",
            "TIPPESSOA",
            "CGC_CPF",
            "EMAIL",
            "TELEFONE",
            "CEP",
            "CODCID",
            "CODBAI",
            "CLIENTE",
            "FORNECEDOR",
            "VENDEDOR",
            "ATIVO",
            "DTCAD",
        ],
        joins: &[],
        filters: &[
            f("nomeparc", "NOMEPARC", Contains),
            f("cliente", "CLIENTE", Flag),
            f("fornecedor", "FORNECEDOR", Flag),
            f("vendedor", "VENDEDOR", Flag),
            f("ativo", "ATIVO", Flag),
            f("email", "EMAIL", Contains),
            f("cep", "CEP", Equals),
            f("tippessoa", "TIPPESSOA", Equals),
            f("codcid", "CODCID", Integer),
            f("codbai", "CODBAI", Integer),
            f("dtcadini", "DTCAD", DateFrom),
            f("dtcadfim", "DTCAD", DateTo),
        ],
        default_sort: "NOMEPARC ASC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tgfven",
        table: "TGFVEN",
        description: "Sellers",
        primary_key: "TGFVEN.CODVEND",
        columns: &[
            "TGFVEN.CODVEND",
            "TGFVEN.APELIDO",
            "TGFVEN.TIPVEND",
            "TGFVEN.CODPARC",
            "TGFPAR.NOMEPARC",
            "TGFVEN.EMAIL",
            "TGFVEN.ATIVO",
        ],
        joins: &["LEFT JOIN TGFPAR ON TGFVEN.CODPARC = TGFPAR.CODPARC"],
        filters: &[
            f("codparc", "TGFVEN.CODPARC", Integer),
            f("nomeparc", "TGFPAR.NOMEPARC", Contains),
            f("apelido", "TGFVEN.APELIDO", Contains),
            f("tipvend", "TGFVEN.TIPVEND", Equals),
            f("ativo", "TGFVEN.ATIVO", Flag),
        ],
        default_sort: "TGFVEN.CODVEND DESC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tsiusu",
        table: "TSIUSU",
        description: "System users",
        primary_key: "CODUSU",
        columns: &["CODUSU", "NOMEUSU", "CODEMP", "CODFUNC", "CODPARC", "EMAIL", "CODGRUPO", "DTLIMACESSO"],
        joins: &[],
        filters: &[
            f("nomeusu", "NOMEUSU", Contains),
            f("codemp", "CODEMP", Integer),
            f("codgrupo", "CODGRUPO", Integer),
            f("email", "EMAIL", Contains),
        ],
        default_sort: "NOMEUSU ASC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tfpfun",
        table: "TFPFUN",
        description: "Employees",
        primary_key: "TFPFUN.CODFUNC",
        columns: &[
            "TFPFUN.CODEMP",
            "TFPFUN.CODFUNC",
            "TFPFUN.NOMEFUNC",
            "TFPFUN.SITUACAO",
            "TFPFUN.CODCARGO",
            "TFPCAR.DESCRCARGO",
            "TFPFUN.CODDEP",
            "TFPDEP.DESCRDEP",
            "TFPFUN.CODPARC",
            "TFPFUN.DTADM",
            "TFPFUN.DTDEM",
        ],
        joins: &[
            "LEFT JOIN TFPCAR ON TFPFUN.CODCARGO = TFPCAR.CODCARGO",
            "LEFT JOIN TFPDEP ON TFPFUN.CODDEP = TFPDEP.CODDEP",
        ],
        filters: &[
            f("nomefunc", "TFPFUN.NOMEFUNC", Contains),
            f("situacao", "TFPFUN.SITUACAO", Equals),
            f("codcargo", "TFPFUN.CODCARGO", Integer),
            f("coddep", "TFPFUN.CODDEP", Integer),
            f("codemp", "TFPFUN.CODEMP", Integer),
            f("dtadmini", "TFPFUN.DTADM", DateFrom),
            f("dtadmfim", "TFPFUN.DTADM", DateTo),
        ],
        default_sort: "TFPFUN.DTADM DESC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tfpdep",
        table: "TFPDEP",
        description: "Departments",
        primary_key: "CODDEP",
        columns: &["CODDEP", "DESCRDEP", "CODDEPPAI", "CODCENCUS", "ANALITICO", "ATIVO"],
        joins: &[],
        filters: &[
            f("descrdep", "DESCRDEP", Contains),
            f("ativo", "ATIVO", Flag),
            f("coddep", "CODDEP", Integer),
            f("codcencus", "CODCENCUS", Integer),
            f("analitico", "ANALITICO", Flag),
        ],
        default_sort: "DESCRDEP ASC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "tfpcar",
        table: "TFPCAR",
        description: "Job titles",
        primary_key: "CODCARGO",
        columns: &["CODCARGO", "DESCRCARGO", "CODGRUPOCARGO", "ATIVO"],
        joins: &[],
        filters: &[
            f("descrcargo", "DESCRCARGO", Contains),
            f("ativo", "ATIVO", Flag),
            f("codgrupocargo", "CODGRUPOCARGO", Integer),
        ],
        default_sort: "DESCRCARGO ASC",
        max_per_page: None,
        unsortable: &[],
    },
    TableDef {
        route: "ad_gig_log",
        table: "AD_GIG_LOG",
        description: "Audit log of changes made through the ERP",
        primary_key: "AD_GIG_LOG.ID",
        columns: &[
            "AD_GIG_LOG.ID",
            "AD_GIG_LOG.ACAO",
            "AD_GIG_LOG.TABELA",
            "AD_GIG_LOG.CODUSU",
            "TSIUSU.NOMEUSU",
            "AD_GIG_LOG.CAMPOS_ALTERADOS",
            "AD_GIG_LOG.VERSAO_NOVA",
            "AD_GIG_LOG.VERSAO_ANTIGA",
            "AD_GIG_LOG.DTCREATED",
        ],
        joins: &["LEFT JOIN TSIUSU ON AD_GIG_LOG.CODUSU = TSIUSU.CODUSU"],
        filters: &[f("tabela", "AD_GIG_LOG.TABELA", Equals)],
        default_sort: "AD_GIG_LOG.ID DESC",
        max_per_page: Some(20),
        // the upstream errors when ordering by DTCREATED
        unsortable: &["DTCREATED"],
    },
];
